//! Fuzz target for specification parsing.
//!
//! Model output is untrusted, so the parser must reject anything it cannot
//! validate without panicking, and whatever it accepts must execute.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve::profile::default_profile;
use sieve::{Dataset, ExecutionEngine, SpecParser};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let profile = default_profile();
    let Ok(spec) = SpecParser::new(&profile.schema).parse(text) else {
        return;
    };

    let headers = profile.schema.column_names();
    let rows = vec![vec![
        "1", "C001", "RF28", "Samsung", "28", "1299.99", "2024-01-15", "North", "1 Elm St",
        "Quiet", "Positive",
    ]];
    let dataset = Dataset::from_text_rows(&profile.schema, &headers, &rows);
    let _ = ExecutionEngine::new().execute(&spec, &dataset, &profile.schema);
});
