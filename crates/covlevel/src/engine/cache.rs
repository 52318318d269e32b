//! Bounded per-locale evaluator cache.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use crate::engine::evaluator::CoverageEvaluator;
use crate::engine::rule_set::RuleSet;
use crate::engine::supplemental::{SupplementalData, normalize_locale};

/// Default maximum number of cached evaluators.
pub const DEFAULT_CAPACITY: usize = 500;

/// Lazily builds and memoizes one [`CoverageEvaluator`] per locale.
///
/// Every evaluator shares the same [`RuleSet`]. A hit marks the locale as
/// most recently used; at capacity the least recently used locale is
/// evicted. Evaluators are built outside the lock. Entries may be dropped
/// at any time (capacity or [`release_unused`](Self::release_unused)), so
/// callers must not rely on getting the same `Arc` back twice.
pub struct EvaluatorCache {
    rules: Arc<RuleSet>,
    data: Arc<dyn SupplementalData>,
    entries: Mutex<LruCache<String, Arc<CoverageEvaluator>>>,
}

#[bon::bon]
impl EvaluatorCache {
    #[builder]
    pub fn new(
        rules: Arc<RuleSet>,
        data: Arc<dyn SupplementalData>,
        #[builder(default = DEFAULT_CAPACITY)] capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            rules,
            data,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl EvaluatorCache {
    /// The evaluator for `locale`, building it on first use.
    pub fn get(&self, locale: &str) -> Arc<CoverageEvaluator> {
        let key = normalize_locale(locale);
        if let Some(cached) = self.entries.lock().get(&key) {
            return Arc::clone(cached);
        }

        trace!(locale = %key, "building coverage evaluator");
        let built = Arc::new(CoverageEvaluator::for_locale(
            Arc::clone(&self.rules),
            self.data.as_ref(),
            &key,
        ));

        let mut entries = self.entries.lock();
        // Another thread may have inserted while we were building.
        if let Some(existing) = entries.get(&key) {
            return Arc::clone(existing);
        }
        entries.put(key, Arc::clone(&built));
        built
    }

    /// Drop every entry no caller currently holds. Returns how many were
    /// dropped.
    pub fn release_unused(&self) -> usize {
        let mut entries = self.entries.lock();
        let idle: Vec<String> = entries
            .iter()
            .filter(|(_, evaluator)| Arc::strong_count(evaluator) == 1)
            .map(|(locale, _)| locale.clone())
            .collect();
        for locale in &idle {
            entries.pop(locale);
        }
        trace!(released = idle.len(), "released idle coverage evaluators");
        idle.len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Whether `locale` is cached. Does not affect recency.
    pub fn contains(&self, locale: &str) -> bool {
        self.entries.lock().contains(&normalize_locale(locale))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }
}
