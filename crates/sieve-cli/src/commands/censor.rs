//! Censor command - print the pseudonym for a single value.

use sieve::{CensorKind, CensoringService};

pub fn run(value: &str, kind: CensorKind) -> Result<(), Box<dyn std::error::Error>> {
    let service = CensoringService::new();
    println!("{}", service.censor(value, kind));
    Ok(())
}
