//! Validate command - check a query specification without running it.

use std::fs;

use colored::Colorize;
use sieve::{Profile, SieveError, SpecParser};

pub fn run(spec: &str, profile: &str) -> Result<(), Box<dyn std::error::Error>> {
    let profile = Profile::resolve(profile)?;

    let text = match spec.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Cannot read specification file '{}': {}", path, e))?,
        None => spec.to_string(),
    };

    match SpecParser::new(&profile.schema).parse(&text) {
        Ok(parsed) => {
            println!("{} {}", "✓".green().bold(), "Specification is valid".green());
            println!("{}", serde_json::to_string_pretty(&parsed)?);
            Ok(())
        }
        Err(SieveError::Validation(violations)) => {
            println!(
                "{} {} field(s) rejected:",
                "✗".red().bold(),
                violations.len().to_string().red()
            );
            for violation in &violations {
                println!("  {} {}", violation.field.yellow(), violation.message);
            }
            Err("Specification is invalid".into())
        }
        Err(e) => Err(e.into()),
    }
}
