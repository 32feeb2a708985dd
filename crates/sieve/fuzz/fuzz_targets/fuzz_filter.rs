//! Fuzz target for filter operands.
//!
//! Operands reach the engine verbatim from model output, so arbitrary bound
//! strings must produce a response and never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve::profile::default_profile;
use sieve::{Dataset, Sieve};

fn sieve() -> Sieve {
    let profile = default_profile();
    let headers = profile.schema.column_names();
    let row = vec![
        "1", "C1001", "M1", "LG", "30", "1299.99", "2024-01-15", "North", "12 Elm St", "",
        "Positive",
    ];
    let dataset = Dataset::from_text_rows(&profile.schema, &headers, &[row]);
    Sieve::from_parts(profile, dataset).unwrap()
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let (start, end) = content.split_once('\n').unwrap_or((content, content));
    let sieve = sieve();

    let range = serde_json::json!({
        "filters": [{"column": "SALES_DATE", "op": "date_range", "value": [start, end]}]
    });
    let _ = sieve.answer_with_spec("fuzz", &range.to_string());

    for op in ["gte", "lte", "eq"] {
        let spec = serde_json::json!({
            "filters": [{"column": "SALES_DATE", "op": op, "value": end}]
        });
        let _ = sieve.answer_with_spec("fuzz", &spec.to_string());
    }
});
