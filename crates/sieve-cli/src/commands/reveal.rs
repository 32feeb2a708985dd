//! Reveal command - map pseudonyms in text back to dataset values.

use colored::Colorize;
use sieve::{Sieve, SieveConfig};
use tracing::info;

pub fn run(config: &SieveConfig, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sieve = Sieve::open(config)?;
    let indexed = sieve.index_pseudonyms();
    info!(pseudonyms = indexed, "pseudonyms indexed");

    let revealed = sieve.censor().desensitize_text(text);
    if revealed == text {
        eprintln!("{}", "No known pseudonyms found in the text.".yellow());
    }
    println!("{}", revealed);
    Ok(())
}
