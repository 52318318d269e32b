//! Integration tests for supplemental data and target language derivation

use std::collections::BTreeSet;
use std::fs;

use covlevel::{
    CoverageLevel, LanguageCoverageData, StaticSupplementalData, SupplementalData,
    plural_categories, target_language,
};

const JSON: &str = r#"{
    "languages": {
        "de": {
            "scripts": ["Latn"],
            "territories": ["DE", "AT", "CH"],
            "currencies": ["EUR", "CHF"]
        },
        "ja": {
            "scripts": ["Jpan"],
            "plurals": ["other"],
            "calendars": ["gregorian", "japanese"]
        }
    },
    "organizations": {
        "Cldr": { "modern": ["de", "ja"], "basic": ["cy"] }
    }
}"#;

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn test_target_language() {
    assert_eq!(target_language("de_CH"), "de");
    assert_eq!(target_language("sr-Latn-RS"), "sr");
    assert_eq!(target_language("en"), "en");
    assert_eq!(target_language("root"), "root");
}

#[test]
fn test_target_language_is_lowercase() {
    assert_eq!(target_language("DE_CH"), "de");
    assert_eq!(target_language("DE_!!"), "de");
    assert_eq!(target_language("Sr-Latn"), "sr");
}

#[test]
fn test_deserialize_json() {
    let data: StaticSupplementalData = serde_json::from_str(JSON).unwrap();
    let languages: Vec<&str> = data.languages().collect();
    assert_eq!(languages, vec!["de", "ja"]);

    let de = data.coverage_context("de");
    assert_eq!(de.target_language(), "de");
    assert_eq!(de.territories(), &set(&["AT", "CH", "DE"]));
    assert_eq!(de.currencies(), &set(&["CHF", "EUR"]));
    assert!(de.time_zones().is_empty());
}

#[test]
fn test_explicit_plurals_override_icu() {
    let data: StaticSupplementalData = serde_json::from_str(JSON).unwrap();
    assert_eq!(data.coverage_context("ja").plurals(), &set(&["other"]));
}

#[test]
fn test_missing_plurals_come_from_icu() {
    let data: StaticSupplementalData = serde_json::from_str(JSON).unwrap();
    let plurals = data.coverage_context("de").plurals().clone();
    assert_eq!(plurals, set(&["one", "other"]));
}

#[test]
fn test_unknown_language_has_empty_sets() {
    let data = StaticSupplementalData::new();
    let context = data.coverage_context("xx");
    assert_eq!(context.target_language(), "xx");
    assert!(context.scripts().is_empty());
    assert!(context.territories().is_empty());
    assert!(context.calendars().is_empty());
}

#[test]
fn test_plural_categories() {
    assert_eq!(plural_categories("en"), set(&["one", "other"]));
    assert!(plural_categories("ar").contains("zero"));
    assert!(plural_categories("not a language").is_empty());
}

#[test]
fn test_organization_lookup_is_case_insensitive() {
    let data: StaticSupplementalData = serde_json::from_str(JSON).unwrap();
    assert_eq!(
        data.locales_at_level("cldr", CoverageLevel::Modern),
        set(&["de", "ja"])
    );
    assert_eq!(
        data.locales_at_level("Cldr", CoverageLevel::Basic),
        set(&["cy"])
    );
    assert!(data.locales_at_level("Cldr", CoverageLevel::Core).is_empty());
    assert!(data.locales_at_level("Other", CoverageLevel::Modern).is_empty());
}

#[test]
fn test_builder_methods() {
    let data = StaticSupplementalData::new()
        .with_language(
            "fr",
            LanguageCoverageData {
                territories: set(&["FR"]),
                ..LanguageCoverageData::default()
            },
        )
        .with_organization_locales("Cldr", CoverageLevel::Modern, ["fr-CA"]);
    assert_eq!(data.coverage_context("fr").territories(), &set(&["FR"]));
    assert_eq!(
        data.locales_at_level("Cldr", CoverageLevel::Modern),
        set(&["fr_CA"])
    );
}

#[test]
fn test_load_json_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("supplemental.json");
    fs::write(&path, JSON).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    let data: StaticSupplementalData = serde_json::from_str(&content).unwrap();
    assert_eq!(data.coverage_context("de").scripts(), &set(&["Latn"]));
}

#[test]
fn test_round_trips_through_json() {
    let data: StaticSupplementalData = serde_json::from_str(JSON).unwrap();
    let json = serde_json::to_string(&data).unwrap();
    let again: StaticSupplementalData = serde_json::from_str(&json).unwrap();
    assert_eq!(again, data);
}
