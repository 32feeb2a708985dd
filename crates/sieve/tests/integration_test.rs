//! Integration tests for Sieve.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use sieve::{
    CensorKind, CensoringService, Confidence, MockProvider, Sieve, SieveConfig, SieveError,
    Value,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

const SMALL_PROFILE: &str = r#"{
    "name": "small",
    "schema": {
        "columns": [
            {"name": "BRAND", "type": "text"},
            {"name": "PRICE", "type": "numeric"},
            {"name": "CUSTOMER_ID", "type": "text", "censor": "customer_id"},
            {"name": "SALES_DATE", "type": "date"}
        ]
    },
    "system_prompt": "Return a JSON specification.",
    "stats_columns": {"brands_count": "BRAND"}
}"#;

const SMALL_DATA: &str = "BRAND,PRICE,CUSTOMER_ID,SALES_DATE\n\
                          Samsung,1200,CUST1,2024-01-10\n\
                          Samsung,900,CUST2,2024-02-10\n\
                          GE,1500,CUST3,2024-03-10\n";

/// Open the three-row dataset under the small profile.
fn open_small() -> (Sieve, NamedTempFile, NamedTempFile) {
    let profile = create_test_file(SMALL_PROFILE, ".json");
    let data = create_test_file(SMALL_DATA, ".csv");

    let config = SieveConfig {
        profile: profile.path().to_string_lossy().into_owned(),
        data_path: Some(data.path().to_path_buf()),
        ..SieveConfig::default()
    };
    let sieve = Sieve::open(&config).expect("Failed to open dataset");
    (sieve, profile, data)
}

fn sample_data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/fridge_sales_with_rating.csv")
}

// =============================================================================
// Example Scenarios
// =============================================================================

#[test]
fn test_eq_filter_returns_matching_rows() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec(
        "Samsung sales",
        r#"{"filters":[{"column":"BRAND","op":"eq","value":"Samsung"}]}"#,
    );

    assert!(!response.is_error());
    assert_eq!(response.sources.len(), 2);
    for record in &response.sources {
        assert_eq!(record["BRAND"], Value::Text("Samsung".to_string()));
    }
}

#[test]
fn test_sort_desc_limit_one_returns_maximum() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec(
        "Most expensive sale",
        r#"{"sort":[{"by":"PRICE","order":"desc"}],"limit":1}"#,
    );

    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0]["PRICE"], Value::Number(1500.0));
    assert_eq!(response.sources[0]["BRAND"], Value::Text("GE".to_string()));
}

#[test]
fn test_identifier_pseudonym_shape_and_determinism() {
    let censor = CensoringService::new();
    let first = censor.censor("CUST12345", CensorKind::Identifier);
    let second = censor.censor("CUST12345", CensorKind::Identifier);

    let shape = regex::Regex::new(r"^DEALER_[A-F0-9]{6}$").unwrap();
    assert!(shape.is_match(&first), "unexpected pseudonym {}", first);
    assert_eq!(first, second);
}

#[test]
fn test_address_pseudonym_reverses_exactly() {
    let censor = CensoringService::new();
    let address = "123 Main St, New York, NY 10001";
    let pseudonym = censor.censor(address, CensorKind::Address);

    let shape = regex::Regex::new(r"^ADDR_[A-F0-9]{8}$").unwrap();
    assert!(shape.is_match(&pseudonym));
    assert_eq!(censor.desensitize(&pseudonym), address);
}

#[test]
fn test_malformed_spec_yields_error_response() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec("q", "This is not valid JSON {");

    assert!(response.is_error());
    assert!(response.sources.is_empty());
    assert_eq!(response.confidence, Confidence::None);
    assert_eq!(response.error.as_ref().unwrap().kind, "parse_error");
}

#[test]
fn test_select_not_a_list_names_field() {
    let (sieve, _p, _d) = open_small();

    let err = sieve.run_spec(r#"{"select":"not_a_list"}"#).unwrap_err();
    match err {
        SieveError::Validation(violations) => {
            assert!(violations.iter().any(|v| v.field == "select"));
        }
        other => panic!("expected validation error, got {other}"),
    }

    let response = sieve.answer_with_spec("q", r#"{"select":"not_a_list"}"#);
    assert!(response.sources.is_empty());
    assert!(response.query_spec.is_none());
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[test]
fn test_sensitive_columns_are_pseudonymized() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec("Who bought?", r#"{"select":["CUSTOMER_ID"]}"#);

    assert_eq!(response.sources.len(), 3);
    for record in &response.sources {
        let Value::Text(text) = &record["CUSTOMER_ID"] else {
            panic!("expected text");
        };
        assert!(text.starts_with("DEALER_"));
        assert!(!text.contains("CUST"));
    }
}

#[test]
fn test_contains_is_case_insensitive() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec(
        "q",
        r#"{"filters":[{"column":"BRAND","op":"contains","value":"sam"}]}"#,
    );
    assert_eq!(response.sources.len(), 2);
}

#[test]
fn test_group_by_with_mean() {
    let (sieve, _p, _d) = open_small();
    let (_, result) = sieve
        .run_spec(r#"{"group_by":["BRAND"],"aggregations":{"PRICE":"mean"},"sort":[{"by":"BRAND"}]}"#)
        .unwrap();

    assert_eq!(result.columns, vec!["BRAND", "PRICE"]);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0]["BRAND"], Value::Text("GE".to_string()));
    assert_eq!(result.rows[1]["PRICE"], Value::Number(1050.0));
}

#[test]
fn test_date_range_filter() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec(
        "q",
        r#"{"filters":[{"column":"SALES_DATE","op":"date_range","value":["2024-02-01","2024-03-31"]}]}"#,
    );
    assert_eq!(response.sources.len(), 2);
}

#[test]
fn test_no_matches_is_not_an_error() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec(
        "q",
        r#"{"filters":[{"column":"BRAND","op":"eq","value":"Bosch"}]}"#,
    );

    assert!(!response.is_error());
    assert!(response.sources.is_empty());
    assert!(response.answer.contains("No matching rows"));
}

#[test]
fn test_ask_with_scripted_provider() {
    let (sieve, _p, _d) = open_small();
    let sieve = sieve.with_llm(MockProvider::new().with_script([
        "```json\n{\"limit\": 2}\n```",
        "not json at all",
    ]));

    let first = sieve.ask("Show two sales");
    assert_eq!(first.sources.len(), 2);

    let second = sieve.ask("Show two sales again");
    assert!(second.is_error());
    assert!(second.sources.is_empty());
}

#[test]
fn test_failing_provider_becomes_llm_error() {
    let (sieve, _p, _d) = open_small();
    let sieve = sieve.with_llm(MockProvider::new().failing("service unavailable"));

    let response = sieve.ask("Anything");
    assert_eq!(response.error.unwrap().kind, "llm_error");
}

#[test]
fn test_response_serializes_to_json() {
    let (sieve, _p, _d) = open_small();
    let response = sieve.answer_with_spec("q", r#"{"limit": 1}"#);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["question"], "q");
    assert_eq!(json["confidence"], "medium");
    assert!(json["sources"].is_array());
}

#[test]
fn test_stats_over_small_dataset() {
    let (sieve, _p, _d) = open_small();
    let stats = sieve.stats();

    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.columns["brands_count"].statistics.distinct, 2);
    assert!(stats.source.unwrap().hash.starts_with("sha256:"));
}

#[test]
fn test_sensitive_numeric_column_reports_no_range() {
    let profile = create_test_file(
        r#"{
            "name": "accounts",
            "schema": {"columns": [
                {"name": "BRAND", "type": "text"},
                {"name": "ACCOUNT_NO", "type": "numeric", "censor": "identifier"}
            ]},
            "system_prompt": "Return a JSON specification.",
            "stats_columns": {"accounts": "ACCOUNT_NO"}
        }"#,
        ".json",
    );
    let data = create_test_file("BRAND,ACCOUNT_NO\nGE,40017\nLG,40512\n", ".csv");
    let config = SieveConfig {
        profile: profile.path().to_string_lossy().into_owned(),
        data_path: Some(data.path().to_path_buf()),
        ..SieveConfig::default()
    };
    let sieve = Sieve::open(&config).unwrap();

    let response = sieve.answer_with_spec("q", r#"{"select":["ACCOUNT_NO"]}"#);
    let json = serde_json::to_value(&response).unwrap();
    let column = &json["statistics"]["columns"]["ACCOUNT_NO"];
    assert_eq!(column["distinct"], 2);
    assert!(column.get("numeric").is_none());
    assert!(!json["sources"].to_string().contains("40017"));

    let stats = sieve.stats();
    let accounts = &stats.columns["accounts"];
    assert!(accounts.statistics.numeric.is_none());
    assert!(accounts.min.is_none() && accounts.max.is_none());
}

// =============================================================================
// Loading Tests
// =============================================================================

#[test]
fn test_tsv_auto_detect() {
    let profile = create_test_file(SMALL_PROFILE, ".json");
    let data = create_test_file(&SMALL_DATA.replace(',', "\t"), ".tsv");

    let config = SieveConfig {
        profile: profile.path().to_string_lossy().into_owned(),
        data_path: Some(data.path().to_path_buf()),
        ..SieveConfig::default()
    };
    let sieve = Sieve::open(&config).unwrap();
    assert_eq!(sieve.dataset().row_count(), 3);
    assert_eq!(sieve.source().unwrap().format, "tsv");
}

#[test]
fn test_missing_columns_rejected() {
    let profile = create_test_file(SMALL_PROFILE, ".json");
    let data = create_test_file("BRAND,PRICE\nGE,100\n", ".csv");

    let config = SieveConfig {
        profile: profile.path().to_string_lossy().into_owned(),
        data_path: Some(data.path().to_path_buf()),
        ..SieveConfig::default()
    };
    let err = Sieve::open(&config).err().unwrap();
    assert_eq!(err.kind(), "profile_error");
    assert!(err.to_string().contains("CUSTOMER_ID"));
}

#[test]
fn test_unknown_profile_is_error() {
    let config = SieveConfig {
        profile: "no_such_profile".to_string(),
        data_path: Some(sample_data_path()),
        ..SieveConfig::default()
    };
    let err = Sieve::open(&config).err().unwrap();
    assert!(err.to_string().contains("default_profile"));
}

#[test]
fn test_bundled_sample_dataset() {
    let config = SieveConfig {
        data_path: Some(sample_data_path()),
        ..SieveConfig::default()
    };
    let sieve = Sieve::open(&config).unwrap();
    assert_eq!(sieve.dataset().row_count(), 12);

    let response = sieve.answer_with_spec(
        "How many sales per brand?",
        r#"{"group_by":["BRAND"],"aggregations":{"ID":"count"},"sort":[{"by":"ID","order":"desc"}]}"#,
    );
    assert!(!response.is_error(), "{:?}", response.error);
    assert_eq!(response.sources[0]["BRAND"], Value::Text("LG".to_string()));

    let addresses = sieve.answer_with_spec("q", r#"{"select":["STORE_ADDRESS"],"limit":3}"#);
    for record in &addresses.sources {
        let Value::Text(text) = &record["STORE_ADDRESS"] else {
            panic!("expected text");
        };
        assert!(text.starts_with("ADDR_"));
    }

    let pseudonym = sieve.censor().censor("C1001", CensorKind::Identifier);
    assert_eq!(sieve.index_pseudonyms(), sieve.censor().len());
    assert_eq!(
        sieve.censor().desensitize_text(&format!("Customer {}", pseudonym)),
        "Customer C1001"
    );
}
