//! Sieve CLI - ask questions of a tabular dataset.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ask {
            question,
            spec,
            json,
            data,
        } => commands::ask::run(&data.to_config(), &question, spec.as_deref(), json),

        Commands::Validate { spec, profile } => commands::validate::run(&spec, &profile),

        Commands::Censor { value, kind } => commands::censor::run(&value, kind),

        Commands::Reveal { text, data } => commands::reveal::run(&data.to_config(), &text),

        Commands::Profiles { json } => commands::profiles::run(json),

        Commands::Serve { host, port, data } => {
            let config = sieve::SieveConfig {
                host,
                port,
                ..data.to_config()
            };
            commands::serve::run(&config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
