//! Property-based tests for the Sieve pipeline.
//!
//! These tests use proptest to generate random inputs and verify that
//! censoring, validation and execution keep their invariants.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p sieve --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p sieve --test property_tests
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use proptest::prelude::*;
use regex::Regex;

use sieve::profile::default_profile;
use sieve::{CensorKind, CensoringService, Dataset, Profile, Sieve, SpecParser, Value};

static IDENTIFIER_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^DEALER_[A-F0-9]{6}$").unwrap());
static ADDRESS_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ADDR_[A-F0-9]{8}$").unwrap());

// =============================================================================
// Test Strategies
// =============================================================================

fn censor_kind() -> impl Strategy<Value = CensorKind> {
    prop_oneof![Just(CensorKind::Identifier), Just(CensorKind::Address)]
}

/// Non-blank values that survive trimming unchanged.
fn sensitive_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ,#\\-]{0,40}[A-Za-z0-9]"
}

/// One sale row: (brand, price, store).
fn sale_row() -> impl Strategy<Value = (String, Option<u32>, String)> {
    (
        prop_oneof![Just("Samsung"), Just("LG"), Just("GE"), Just("Bosch")].prop_map(String::from),
        proptest::option::weighted(0.9, 100u32..3000),
        prop_oneof![Just("North"), Just("South"), Just("East")].prop_map(String::from),
    )
}

fn build_sieve(rows: &[(String, Option<u32>, String)]) -> Sieve {
    let profile = default_profile();
    let headers: Vec<String> = profile
        .schema
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let text_rows: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(i, (brand, price, store))| {
            vec![
                (i + 1).to_string(),
                format!("C{:04}", i),
                "M1".to_string(),
                brand.clone(),
                "25".to_string(),
                price.map(|p| p.to_string()).unwrap_or_default(),
                "2024-01-01".to_string(),
                store.clone(),
                format!("{} Elm St", i),
                String::new(),
                "Neutral".to_string(),
            ]
        })
        .collect();
    let dataset = Dataset::from_text_rows(&profile.schema, &headers, &text_rows);
    Sieve::from_parts(profile, dataset).unwrap()
}

fn any_column(profile: &Profile) -> impl Strategy<Value = String> {
    let names: Vec<String> = profile
        .schema
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    prop_oneof![
        proptest::sample::select(names),
        "[A-Z_]{1,12}".prop_map(|s| s),
    ]
}

// =============================================================================
// Censoring Properties
// =============================================================================

proptest! {
    #[test]
    fn censor_is_deterministic(value in sensitive_value(), kind in censor_kind()) {
        let a = CensoringService::new().censor(&value, kind);
        let b = CensoringService::new().censor(&value, kind);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn pseudonym_has_expected_shape(value in sensitive_value(), kind in censor_kind()) {
        let pseudonym = CensoringService::new().censor(&value, kind);
        let shape = match kind {
            CensorKind::Identifier => &*IDENTIFIER_SHAPE,
            CensorKind::Address => &*ADDRESS_SHAPE,
        };
        prop_assert!(shape.is_match(&pseudonym), "bad pseudonym {}", pseudonym);
    }

    #[test]
    fn desensitize_reverses_censor(value in sensitive_value(), kind in censor_kind()) {
        let service = CensoringService::new();
        let pseudonym = service.censor(&value, kind);
        prop_assert_eq!(service.desensitize(&pseudonym), value);
    }
}

#[test]
fn distinct_values_get_distinct_pseudonyms() {
    let service = CensoringService::new();
    let pseudonyms: HashSet<String> = (0..500)
        .map(|i| service.censor(format!("CUST{:05}", i), CensorKind::Address))
        .collect();
    assert_eq!(pseudonyms.len(), 500);

    let identifiers: HashSet<String> = (0..100)
        .map(|i| service.censor(format!("C{:03}", i), CensorKind::Identifier))
        .collect();
    assert_eq!(identifiers.len(), 100);
}

// =============================================================================
// Validation Properties
// =============================================================================

proptest! {
    #[test]
    fn accepted_specs_only_name_schema_columns(
        select in proptest::collection::vec(any_column(&default_profile()), 0..4),
        sort_by in proptest::option::of(any_column(&default_profile())),
        filter_col in proptest::option::of(any_column(&default_profile())),
    ) {
        let profile = default_profile();
        let mut spec = serde_json::json!({ "select": select });
        if let Some(by) = sort_by {
            spec["sort"] = serde_json::json!([{ "by": by }]);
        }
        if let Some(column) = filter_col {
            spec["filters"] = serde_json::json!([{ "column": column, "op": "neq", "value": "x" }]);
        }

        if let Ok(parsed) = SpecParser::new(&profile.schema).parse(&spec.to_string()) {
            for column in parsed.referenced_columns() {
                prop_assert!(profile.schema.has_column(column), "accepted unknown column {}", column);
            }
        }
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".{0,200}") {
        let profile = default_profile();
        let _ = SpecParser::new(&profile.schema).parse(&text);
    }
}

// =============================================================================
// Execution Properties
// =============================================================================

proptest! {
    #[test]
    fn row_count_respects_limit(
        rows in proptest::collection::vec(sale_row(), 0..60),
        limit in 1usize..800,
    ) {
        let sieve = build_sieve(&rows);
        let spec = format!(r#"{{"limit": {}}}"#, limit);
        let (spec, result) = sieve.run_spec(&spec).unwrap();
        prop_assert!(spec.limit <= sieve.profile().schema.max_limit);
        prop_assert!(result.len() <= limit.min(sieve.profile().schema.max_limit));
        prop_assert_eq!(result.total_rows, rows.len());
    }

    #[test]
    fn sort_is_stable_with_nulls_last(rows in proptest::collection::vec(sale_row(), 0..60)) {
        let sieve = build_sieve(&rows);
        let (_, result) = sieve
            .run_spec(r#"{"select": ["ID", "BRAND", "PRICE"], "sort": [{"by": "BRAND"}], "limit": 500}"#)
            .unwrap();

        let brands: Vec<&Value> = result.rows.iter().map(|r| &r["BRAND"]).collect();
        for pair in brands.windows(2) {
            prop_assert!(pair[0].total_cmp(pair[1]).is_le());
        }

        // Ties keep input order, so ids within one brand stay ascending.
        for pair in result.rows.windows(2) {
            if pair[0]["BRAND"] == pair[1]["BRAND"] {
                let a = pair[0]["ID"].to_string().parse::<usize>().unwrap();
                let b = pair[1]["ID"].to_string().parse::<usize>().unwrap();
                prop_assert!(a < b);
            }
        }

        let (_, by_price) = sieve
            .run_spec(r#"{"select": ["PRICE"], "sort": [{"by": "PRICE", "order": "desc"}], "limit": 500}"#)
            .unwrap();
        let first_null = by_price.rows.iter().position(|r| r["PRICE"].is_null());
        if let Some(index) = first_null {
            prop_assert!(by_price.rows[index..].iter().all(|r| r["PRICE"].is_null()));
        }
    }

    #[test]
    fn date_bounds_never_escape_as_panics(
        start in prop_oneof![".{0,24}", "[+-]?[0-9]{1,6}-[0-9]{2}-[0-9]{2}"],
        end in prop_oneof![
            ".{0,24}",
            "[+-]?[0-9]{1,6}-[0-9]{2}-[0-9]{2}",
            "[0-9]{2}/[0-9]{2}/[+-]?[0-9]{1,6}",
            Just("+262142-12-31".to_string()),
        ],
    ) {
        let sieve = build_sieve(&[("LG".to_string(), Some(900), "North".to_string())]);
        let spec = serde_json::json!({
            "filters": [{"column": "SALES_DATE", "op": "date_range", "value": [start, end]}]
        });
        let response = sieve.answer_with_spec("q", &spec.to_string());
        if let Some(error) = &response.error {
            prop_assert_eq!(error.kind.as_str(), "execution_error");
        }
    }

    #[test]
    fn filters_only_keep_matching_rows(rows in proptest::collection::vec(sale_row(), 0..60)) {
        let sieve = build_sieve(&rows);
        let (_, result) = sieve
            .run_spec(r#"{"filters": [{"column": "BRAND", "op": "eq", "value": "LG"},
                                      {"column": "PRICE", "op": "gte", "value": 1000}],
                         "limit": 500}"#)
            .unwrap();

        let expected = rows
            .iter()
            .filter(|(brand, price, _)| brand == "LG" && price.is_some_and(|p| p >= 1000))
            .count();
        prop_assert_eq!(result.len(), expected);
    }
}
