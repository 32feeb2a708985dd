//! Serve command - run the HTTP API over a loaded dataset.

use std::net::SocketAddr;

use colored::Colorize;
use sieve::{Sieve, SieveConfig};

use crate::server::{app, state::AppState};

pub fn run(config: &SieveConfig) -> Result<(), Box<dyn std::error::Error>> {
    let sieve = Sieve::open(config)?;
    if !sieve.has_llm() {
        eprintln!(
            "{} no LLM provider configured; requests must carry a \"spec\" field",
            "Warning:".yellow()
        );
    }

    let addr = SocketAddr::new(config.host, config.port);
    println!(
        "{} {} records under profile {}",
        "Loaded".green().bold(),
        sieve.dataset().row_count().to_string().white().bold(),
        sieve.profile().name.cyan()
    );
    println!("Listening on {}", format!("http://{}", addr).cyan().underline());
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());

    let state = AppState::new(sieve);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, addr))?;

    println!("{}", "Shutting down...".yellow());
    Ok(())
}
