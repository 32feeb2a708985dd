//! CLI argument definitions using clap.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sieve::{CensorKind, LlmChoice, SieveConfig};

/// Sieve: ask questions of a tabular dataset
#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by every command that opens a dataset.
#[derive(Args, Clone, Debug)]
pub struct DataArgs {
    /// Built-in profile name or path to a JSON profile
    #[arg(short, long, default_value = "default_profile")]
    pub profile: String,

    /// Dataset file (CSV/TSV); defaults to the profile's data path
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// LLM provider that writes query specifications
    #[arg(long, default_value = "none", env = "SIEVE_LLM")]
    pub llm: LlmChoice,

    /// Model to use (provider-specific, e.g., "gpt-4o", "llama3.2")
    #[arg(long)]
    pub model: Option<String>,
}

impl DataArgs {
    pub fn to_config(&self) -> SieveConfig {
        SieveConfig {
            profile: self.profile.clone(),
            data_path: self.data.clone(),
            llm: self.llm,
            model: self.model.clone(),
            ..SieveConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question about the dataset
    Ask {
        /// The question, in plain language
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Use this specification instead of asking the LLM
        #[arg(long, value_name = "JSON")]
        spec: Option<String>,

        /// Output the full response as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        data: DataArgs,
    },

    /// Validate a query specification against a profile's schema
    Validate {
        /// Specification text, or @path to read it from a file
        #[arg(value_name = "SPEC")]
        spec: String,

        /// Built-in profile name or path to a JSON profile
        #[arg(short, long, default_value = "default_profile")]
        profile: String,
    },

    /// Print the pseudonym for a value
    Censor {
        /// Value to censor
        #[arg(value_name = "VALUE")]
        value: String,

        /// Censoring class (identifier, customer_id, dealer_code, address)
        #[arg(short, long, default_value = "identifier", value_parser = parse_kind)]
        kind: CensorKind,
    },

    /// Replace pseudonyms in text with the dataset values they stand for
    Reveal {
        /// Text containing pseudonyms
        #[arg(value_name = "TEXT")]
        text: String,

        #[command(flatten)]
        data: DataArgs,
    },

    /// List built-in profiles
    Profiles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port for web server
        #[arg(long, default_value_t = sieve::DEFAULT_PORT)]
        port: u16,

        #[command(flatten)]
        data: DataArgs,
    },
}

fn parse_kind(s: &str) -> Result<CensorKind, String> {
    CensorKind::from_tag(s).ok_or_else(|| {
        format!(
            "Unknown censoring class: {}. Use identifier, customer_id, dealer_code or address.",
            s
        )
    })
}
