//! Fuzz target for date parsing.
//!
//! Dates arrive both as dataset cells and as filter operands.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve::input::{Value, parse_date};
use sieve::ColumnType;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_date(content);
        let _ = Value::parse_cell(content, ColumnType::Date);
    }
});
