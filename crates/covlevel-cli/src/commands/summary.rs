//! Implementation of the `covlevel summary` command.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use covlevel::{CoverageEvaluator, CoverageLevel, EvaluatorCache};
use miette::{IntoDiagnostic, Result, miette};
use serde::Serialize;

use super::{load_data, load_rules, read_paths};
use crate::output::table::{LocaleSummary, format_summary_table};

/// Arguments for the summary command.
#[derive(Debug, clap::Args)]
pub struct SummaryArgs {
    /// Rule file
    #[arg(long, env = "COVLEVEL_RULES")]
    pub rules: PathBuf,

    /// Supplemental data file (JSON)
    #[arg(long, env = "COVLEVEL_DATA")]
    pub data: Option<PathBuf>,

    /// File with one path per line
    #[arg(long)]
    pub paths: PathBuf,

    /// Locales to summarize (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub locale: Vec<String>,

    /// Output results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for one locale.
#[derive(Debug, Serialize)]
struct SummaryJson {
    locale: String,
    total: usize,
    levels: BTreeMap<CoverageLevel, usize>,
}

/// Run the summary command.
pub fn run_summary(args: SummaryArgs) -> Result<i32> {
    let source = load_rules(&args.rules)?;
    let data = load_data(args.data.as_ref())?;
    let file = File::open(&args.paths)
        .into_diagnostic()
        .map_err(|e| miette!("Failed to open paths file {}: {}", args.paths.display(), e))?;
    let paths = read_paths(BufReader::new(file)).into_diagnostic()?;

    let cache = EvaluatorCache::builder()
        .rules(Arc::clone(source.coverage()))
        .data(data)
        .build();

    let summaries: Vec<LocaleSummary> = args
        .locale
        .iter()
        .map(|locale| LocaleSummary {
            locale: locale.clone(),
            counts: count_levels(&cache.get(locale), &paths),
        })
        .collect();

    if args.json {
        let json_data: Vec<SummaryJson> = summaries
            .iter()
            .map(|s| SummaryJson {
                locale: s.locale.clone(),
                total: s.total(),
                levels: s.counts.clone(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_data).into_diagnostic()?);
    } else {
        println!("{}", format_summary_table(&summaries));
    }

    Ok(exitcode::OK)
}

/// Number of `paths` at each level for one locale.
fn count_levels(evaluator: &CoverageEvaluator, paths: &[String]) -> BTreeMap<CoverageLevel, usize> {
    let mut counts = BTreeMap::new();
    for path in paths {
        *counts.entry(evaluator.level(path.as_str())).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use covlevel::{LanguageCoverageData, RuleSource, StaticSupplementalData};

    use super::*;

    #[test]
    fn test_count_levels_per_locale() {
        let source = RuleSource::parse(
            r#"
            coverage basic "scripts/script[@type='${Target-Scripts}']";
            coverage modern "numbers/.*";
            "#,
        )
        .unwrap();
        let data = StaticSupplementalData::new().with_language(
            "ru",
            LanguageCoverageData {
                scripts: ["Cyrl".to_string()].into_iter().collect(),
                ..LanguageCoverageData::default()
            },
        );
        let cache = EvaluatorCache::builder()
            .rules(Arc::clone(source.coverage()))
            .data(Arc::new(data))
            .build();
        let paths = vec![
            "//ldml/scripts/script[@type=\"Cyrl\"]".to_string(),
            "//ldml/numbers/decimal".to_string(),
            "//ldml/other".to_string(),
        ];

        let ru = count_levels(&cache.get("ru"), &paths);
        assert_eq!(ru.get(&CoverageLevel::Basic), Some(&1));
        assert_eq!(ru.get(&CoverageLevel::Modern), Some(&1));
        assert_eq!(ru.get(&CoverageLevel::Comprehensive), Some(&1));

        let en = count_levels(&cache.get("en"), &paths);
        assert_eq!(en.get(&CoverageLevel::Basic), None);
        assert_eq!(en.get(&CoverageLevel::Comprehensive), Some(&2));
    }

    #[test]
    fn test_summary_table_has_row_per_locale() {
        let summaries = vec![LocaleSummary {
            locale: "de".to_string(),
            counts: BTreeMap::from([(CoverageLevel::Core, 3), (CoverageLevel::Modern, 2)]),
        }];
        let table = format_summary_table(&summaries).to_string();
        assert!(table.contains("de"));
        assert!(table.contains("comprehensive"));
        assert_eq!(summaries[0].total(), 5);
    }
}
