//! Fuzz target for dataset loading.
//!
//! The loader must never panic on malformed delimited input, whatever the
//! detected delimiter.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sieve::DatasetLoader;
use sieve::profile::default_profile;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let profile = default_profile();
    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let _ = DatasetLoader::new().load_file(temp_file.path(), &profile.schema);
        }
    }
});
