//! Integration tests for rule set evaluation

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use covlevel::{
    CoverageEvaluator, CoverageLevel, LocaleCoverageContext, RejectReason, RuleDefinition,
    RuleSet, VariableKind,
};

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn rule(template: &str, level: CoverageLevel) -> RuleDefinition {
    RuleDefinition::builder()
        .template(template)
        .level(level)
        .build()
}

fn latin_context() -> LocaleCoverageContext {
    LocaleCoverageContext::builder()
        .target_language("en")
        .scripts(set(&["Latn"]))
        .build()
}

/// The two-rule example: a script-bound rule followed by a catch-all.
fn example_rules() -> RuleSet {
    RuleSet::builder()
        .rules(vec![
            rule("//x/y[@z=\"${Target-Scripts}\"]", CoverageLevel::Modern),
            rule("//x/.*", CoverageLevel::Comprehensive),
        ])
        .root("")
        .build()
        .unwrap()
}

#[test]
fn test_example_script_in_context() {
    let rules = example_rules();
    assert_eq!(
        rules.resolve_level("//x/y[@z=\"Latn\"]", &latin_context()),
        CoverageLevel::Modern
    );
}

#[test]
fn test_example_script_not_in_context_falls_through() {
    let rules = example_rules();
    let context = latin_context();
    assert_eq!(
        rules.resolve_level("//x/y[@z=\"Cyrl\"]", &context),
        CoverageLevel::Comprehensive
    );
    let found = rules.explain("//x/y[@z=\"Cyrl\"]", &context).unwrap();
    assert_eq!(found.index, 1);
}

#[test]
fn test_example_other_path() {
    let rules = example_rules();
    assert_eq!(
        rules.resolve_level("//x/other", &latin_context()),
        CoverageLevel::Comprehensive
    );
}

#[test]
fn test_first_match_wins() {
    let rules = RuleSet::builder()
        .rules(vec![
            rule("a/.*", CoverageLevel::Modern),
            rule("a/b", CoverageLevel::Core),
        ])
        .build()
        .unwrap();
    assert_eq!(
        rules.resolve_level("//ldml/a/b", &latin_context()),
        CoverageLevel::Modern
    );
}

#[test]
fn test_declaration_order_is_kept() {
    let rules = RuleSet::builder()
        .rules(vec![
            rule("z", CoverageLevel::Comprehensive),
            rule("a", CoverageLevel::Core),
            rule("m", CoverageLevel::Basic),
        ])
        .build()
        .unwrap();
    let raw: Vec<&str> = rules.rules().iter().map(|r| r.raw_pattern()).collect();
    assert_eq!(raw, vec!["z", "a", "m"]);
}

#[test]
fn test_no_match_is_comprehensive() {
    let rules = RuleSet::builder()
        .rules(vec![rule("a", CoverageLevel::Core)])
        .build()
        .unwrap();
    assert_eq!(
        rules.resolve_level("//ldml/b", &latin_context()),
        CoverageLevel::Comprehensive
    );
    assert!(rules.explain("//ldml/b", &latin_context()).is_none());
}

#[test]
fn test_empty_rule_set() {
    let rules = RuleSet::builder().rules(Vec::new()).build().unwrap();
    assert!(rules.is_empty());
    assert_eq!(
        rules.resolve_level("//ldml/anything", &latin_context()),
        CoverageLevel::Comprehensive
    );
}

#[test]
fn test_plurals_absent_count_matches() {
    let rules = RuleSet::builder()
        .rules(vec![rule(
            "units/unit(\\[@count=\"${Target-Plurals}\"\\])?",
            CoverageLevel::Basic,
        )])
        .build()
        .unwrap();
    let context = LocaleCoverageContext::builder()
        .target_language("en")
        .plurals(set(&["one", "other"]))
        .build();
    assert_eq!(
        rules.resolve_level("//ldml/units/unit", &context),
        CoverageLevel::Basic
    );
    assert_eq!(
        rules.resolve_level("//ldml/units/unit[@count=\"one\"]", &context),
        CoverageLevel::Basic
    );
    assert_eq!(
        rules.resolve_level("//ldml/units/unit[@count=\"few\"]", &context),
        CoverageLevel::Comprehensive
    );
}

#[test]
fn test_plurals_empty_capture_matches() {
    let rules = RuleSet::builder()
        .rules(vec![rule(
            "units/unit[@count=\"${Target-Plurals}\"]",
            CoverageLevel::Basic,
        )])
        .build()
        .unwrap();
    let context = LocaleCoverageContext::builder()
        .target_language("ja")
        .build();
    assert_eq!(
        rules.resolve_level("//ldml/units/unit[@count=\"\"]", &context),
        CoverageLevel::Basic
    );
}

#[test]
fn test_language_variable_is_exact() {
    let rules = RuleSet::builder()
        .rules(vec![rule(
            "languages/language[@type=\"${Target-Language}\"]",
            CoverageLevel::Core,
        )])
        .build()
        .unwrap();
    let context = LocaleCoverageContext::builder()
        .target_language("de")
        .build();
    assert_eq!(
        rules.resolve_level("//ldml/languages/language[@type=\"de\"]", &context),
        CoverageLevel::Core
    );
    assert_eq!(
        rules.resolve_level("//ldml/languages/language[@type=\"de_CH\"]", &context),
        CoverageLevel::Comprehensive
    );
}

#[test]
fn test_each_set_variable_uses_its_own_set() {
    let context = LocaleCoverageContext::builder()
        .target_language("fr")
        .territories(set(&["FR"]))
        .time_zones(set(&["Europe/Paris"]))
        .currencies(set(&["EUR"]))
        .calendars(set(&["gregorian"]))
        .build();
    let cases = [
        ("${Target-Territories}", "FR", "EUR"),
        ("${Target-TimeZones}", "Europe/Paris", "FR"),
        ("${Target-Currencies}", "EUR", "gregorian"),
        ("${Calendar-List}", "gregorian", "Europe/Paris"),
    ];
    for (placeholder, member, other) in cases {
        let rules = RuleSet::builder()
            .rules(vec![rule(
                &format!("x[@type=\"{placeholder}\"]"),
                CoverageLevel::Moderate,
            )])
            .build()
            .unwrap();
        let hit = format!("//ldml/x[@type=\"{member}\"]");
        let miss = format!("//ldml/x[@type=\"{other}\"]");
        assert_eq!(rules.resolve_level(&hit, &context), CoverageLevel::Moderate);
        assert_eq!(
            rules.resolve_level(&miss, &context),
            CoverageLevel::Comprehensive
        );
    }
}

#[test]
fn test_direct_predicates_any_one_suffices() {
    let rules = RuleSet::builder()
        .rules(vec![
            RuleDefinition::builder()
                .template("numbers/minimumGroupingDigits")
                .level(CoverageLevel::Modern)
                .in_language("(de|fi)")
                .in_territory("CH LI")
                .build(),
        ])
        .build()
        .unwrap();
    let path = "//ldml/numbers/minimumGroupingDigits";

    let german = LocaleCoverageContext::builder().target_language("de").build();
    assert_eq!(rules.resolve_level(path, &german), CoverageLevel::Modern);

    let swiss_italian = LocaleCoverageContext::builder()
        .target_language("it")
        .territories(set(&["CH", "IT"]))
        .build();
    assert_eq!(rules.resolve_level(path, &swiss_italian), CoverageLevel::Modern);

    let french = LocaleCoverageContext::builder()
        .target_language("fr")
        .territories(set(&["FR"]))
        .build();
    assert_eq!(rules.resolve_level(path, &french), CoverageLevel::Comprehensive);
}

#[test]
fn test_in_language_is_full_match() {
    let rules = RuleSet::builder()
        .rules(vec![
            RuleDefinition::builder()
                .template("x")
                .level(CoverageLevel::Basic)
                .in_language("de")
                .build(),
        ])
        .build()
        .unwrap();
    let dsb = LocaleCoverageContext::builder().target_language("dsb").build();
    assert_eq!(rules.resolve_level("//ldml/x", &dsb), CoverageLevel::Comprehensive);
}

#[test]
fn test_in_script_predicate() {
    let rules = RuleSet::builder()
        .rules(vec![
            RuleDefinition::builder()
                .template("x")
                .level(CoverageLevel::Basic)
                .in_script("Cyrl Grek")
                .build(),
        ])
        .build()
        .unwrap();
    let serbian = LocaleCoverageContext::builder()
        .target_language("sr")
        .scripts(set(&["Cyrl", "Latn"]))
        .build();
    assert_eq!(rules.resolve_level("//ldml/x", &serbian), CoverageLevel::Basic);
    assert_eq!(
        rules.resolve_level("//ldml/x", &latin_context()),
        CoverageLevel::Comprehensive
    );
}

#[test]
fn test_rejections_explain_each_skip() {
    let rules = RuleSet::builder()
        .rules(vec![
            RuleDefinition::builder()
                .template("x/y")
                .level(CoverageLevel::Core)
                .in_language("ja")
                .build(),
            rule("x/z", CoverageLevel::Basic),
            rule("x/${Target-Scripts}", CoverageLevel::Moderate),
            rule("x/.*", CoverageLevel::Modern),
        ])
        .build()
        .unwrap();
    let rejected = rules.rejections("//ldml/x/y", &latin_context());
    let reasons: Vec<(usize, RejectReason)> =
        rejected.into_iter().map(|r| (r.index, r.reason)).collect();
    assert_eq!(
        reasons,
        vec![
            (0, RejectReason::ContextPredicate),
            (1, RejectReason::NoMatch),
            (
                2,
                RejectReason::VariableNotInContext {
                    kind: VariableKind::Scripts,
                    value: Some("y".to_string()),
                }
            ),
        ]
    );
    let found = rules.explain("//ldml/x/y", &latin_context()).unwrap();
    assert_eq!(found.index, 3);
    assert_eq!(found.rule.level(), CoverageLevel::Modern);
}

#[test]
fn test_trace_agrees_with_separate_queries() {
    let rules = RuleSet::builder()
        .rules(vec![
            rule("x/z", CoverageLevel::Basic),
            rule("x/${Target-Scripts}", CoverageLevel::Moderate),
            rule("x/.*", CoverageLevel::Modern),
        ])
        .build()
        .unwrap();
    let context = latin_context();
    for path in ["//ldml/x/y", "//ldml/x/Latn", "//ldml/q"] {
        let trace = rules.trace(path, &context);
        assert_eq!(trace.level(), rules.resolve_level(path, &context));
        assert_eq!(trace.rejections, rules.rejections(path, &context));
        assert_eq!(
            trace.matched.map(|found| found.index),
            rules.explain(path, &context).map(|found| found.index)
        );
    }
    let trace = rules.trace("//ldml/q", &context);
    assert!(trace.matched.is_none());
    assert_eq!(trace.level(), CoverageLevel::Comprehensive);
    assert_eq!(trace.rejections.len(), 3);
}

#[test]
fn test_explain_reports_capture() {
    let rules = example_rules();
    let found = rules
        .explain("//x/y[@z=\"Latn\"]", &latin_context())
        .unwrap();
    assert_eq!(found.index, 0);
    assert_eq!(found.captured, Some("Latn"));
    assert_eq!(found.rule.variable(), Some(VariableKind::Scripts));
}

#[test]
fn test_evaluator_absent_path_is_undetermined() {
    let evaluator = CoverageEvaluator::new("en", Arc::new(example_rules()), latin_context());
    assert_eq!(evaluator.level(None), CoverageLevel::Undetermined);
    assert_eq!(evaluator.int_level(None), 0);
    assert_eq!(evaluator.level("//x/y[@z=\"Latn\"]"), CoverageLevel::Modern);
    assert_eq!(evaluator.int_level("//x/other"), 100);
}

#[test]
fn test_evaluation_is_repeatable() {
    let evaluator = CoverageEvaluator::new("en", Arc::new(example_rules()), latin_context());
    let paths = ["//x/y[@z=\"Latn\"]", "//x/y[@z=\"Cyrl\"]", "//x/other", "//q"];
    let first: Vec<CoverageLevel> = paths.iter().map(|p| evaluator.level(*p)).collect();
    for _ in 0..3 {
        let again: Vec<CoverageLevel> = paths.iter().map(|p| evaluator.level(*p)).collect();
        assert_eq!(again, first);
    }
}

#[test]
fn test_concurrent_evaluation_shares_rules() {
    let rules = Arc::new(example_rules());
    let latin = CoverageEvaluator::new("en", Arc::clone(&rules), latin_context());
    let cyrillic = CoverageEvaluator::new(
        "ru",
        Arc::clone(&rules),
        LocaleCoverageContext::builder()
            .target_language("ru")
            .scripts(set(&["Cyrl"]))
            .build(),
    );
    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    assert_eq!(latin.level("//x/y[@z=\"Latn\"]"), CoverageLevel::Modern);
                    assert_eq!(
                        cyrillic.level("//x/y[@z=\"Latn\"]"),
                        CoverageLevel::Comprehensive
                    );
                    assert_eq!(cyrillic.level("//x/y[@z=\"Cyrl\"]"), CoverageLevel::Modern);
                }
            });
        }
    });
    assert!(Arc::ptr_eq(latin.rules(), cyrillic.rules()));
}
