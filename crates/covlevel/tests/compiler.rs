//! Integration tests for template compilation

use covlevel::engine::{CompileError, DEFAULT_ROOT, compile_template};
use covlevel::{CoverageLevel, MatchRule, RuleDefinition, VariableKind};

#[test]
fn test_anchored_at_root_and_end() {
    let compiled = compile_template("numbers/currencyFormats", DEFAULT_ROOT).unwrap();
    assert!(compiled.match_path("//ldml/numbers/currencyFormats").is_some());
    assert!(compiled.match_path("//ldml/numbers/currencyFormats/x").is_none());
    assert!(compiled.match_path("/x//ldml/numbers/currencyFormats").is_none());
}

#[test]
fn test_alternation_stays_inside_anchors() {
    let compiled = compile_template("a|b", DEFAULT_ROOT).unwrap();
    assert!(compiled.match_path("//ldml/a").is_some());
    assert!(compiled.match_path("//ldml/b").is_some());
    assert!(compiled.match_path("//ldml/ab").is_none());
    assert!(compiled.match_path("b").is_none());
}

#[test]
fn test_custom_root_is_escaped() {
    let compiled = compile_template("x", "//a.b/").unwrap();
    assert!(compiled.match_path("//a.b/x").is_some());
    assert!(compiled.match_path("//aXb/x").is_none());
}

#[test]
fn test_single_quotes_match_double_quoted_paths() {
    let compiled = compile_template("x[@type='standard']", DEFAULT_ROOT).unwrap();
    assert!(compiled.match_path("//ldml/x[@type=\"standard\"]").is_some());
}

#[test]
fn test_attribute_brackets_are_literal() {
    let compiled = compile_template("x[@type=\"a\"]", DEFAULT_ROOT).unwrap();
    assert!(compiled.match_path("//ldml/x@type=\"a\"").is_none());
}

#[test]
fn test_variable_captures_attribute_value() {
    let compiled = compile_template("x[@type=\"${Target-Currencies}\"]", DEFAULT_ROOT).unwrap();
    assert_eq!(compiled.variable(), Some(VariableKind::Currencies));
    assert_eq!(
        compiled.match_path("//ldml/x[@type=\"EUR\"]"),
        Some(Some("EUR"))
    );
}

#[test]
fn test_variable_capture_stops_at_quote() {
    let compiled = compile_template("x[@type=\"${Target-Currencies}\"]", DEFAULT_ROOT).unwrap();
    assert_eq!(compiled.match_path("//ldml/x[@type=\"EU\"R\"]"), None);
}

#[test]
fn test_optional_group_around_variable_may_not_participate() {
    let compiled =
        compile_template("x(\\[@count=\"${Target-Plurals}\"\\])?", DEFAULT_ROOT).unwrap();
    assert_eq!(compiled.match_path("//ldml/x"), Some(None));
    assert_eq!(
        compiled.match_path("//ldml/x[@count=\"few\"]"),
        Some(Some("few"))
    );
}

#[test]
fn test_two_variables_fail() {
    let err = compile_template("a/${Target-Scripts}/${Target-Territories}", DEFAULT_ROOT)
        .unwrap_err();
    match err {
        CompileError::MultipleVariables { found, .. } => {
            assert_eq!(found, vec![VariableKind::Scripts, VariableKind::Territories]);
        }
        other => panic!("expected MultipleVariables, got {other:?}"),
    }
}

#[test]
fn test_same_variable_twice_fails() {
    let err =
        compile_template("a/${Target-Scripts}|b/${Target-Scripts}", DEFAULT_ROOT).unwrap_err();
    assert!(matches!(err, CompileError::MultipleVariables { .. }));
}

#[test]
fn test_unknown_variable_is_parse_error() {
    let err = compile_template("a/${Target-Lang}", DEFAULT_ROOT).unwrap_err();
    assert!(matches!(err, CompileError::Parse { .. }));
}

#[test]
fn test_invalid_regex() {
    let err = compile_template("*a", DEFAULT_ROOT).unwrap_err();
    assert!(matches!(err, CompileError::InvalidRegex { .. }), "{err:?}");
}

#[test]
fn test_negative_lookahead_excludes() {
    let compiled = compile_template("units/(?!alias)[^/]+", DEFAULT_ROOT).unwrap();
    assert!(compiled.match_path("//ldml/units/unitLength").is_some());
    assert!(compiled.match_path("//ldml/units/alias").is_none());
}

#[test]
fn test_possessive_quantifier_never_gives_back() {
    let compiled = compile_template("x/.++/y", DEFAULT_ROOT).unwrap();
    assert!(compiled.match_path("//ldml/x/a/y").is_none());

    let compiled = compile_template("x/[^/]++/y", DEFAULT_ROOT).unwrap();
    assert!(compiled.match_path("//ldml/x/a/y").is_some());
}

#[test]
fn test_invalid_language_predicate() {
    let definition = RuleDefinition::builder()
        .template("x")
        .level(CoverageLevel::Basic)
        .in_language("(de")
        .build();
    let err = MatchRule::compile(&definition, DEFAULT_ROOT).unwrap_err();
    assert!(matches!(err, CompileError::InvalidPredicate { .. }));
}

#[test]
fn test_match_rule_keeps_raw_pattern() {
    let definition = RuleDefinition::builder()
        .template("x/${Target-Language}")
        .level(CoverageLevel::Core)
        .build();
    let rule = MatchRule::compile(&definition, DEFAULT_ROOT).unwrap();
    assert_eq!(rule.raw_pattern(), "x/${Target-Language}");
    assert_eq!(rule.variable(), Some(VariableKind::Language));
    assert_eq!(rule.level(), CoverageLevel::Core);
    assert_eq!(rule.regex_source(), "^//ldml/(?:x/([^\"]*))$");
}
