//! Sieve: natural-language questions over tabular datasets.
//!
//! A language model translates each question into a small JSON query
//! specification. Sieve validates that specification against the dataset's
//! schema, executes it deterministically, and returns rows with sensitive
//! columns replaced by stable pseudonyms.
//!
//! # Core Principles
//!
//! - **Untrusted model output**: nothing runs until the specification validates
//! - **Deterministic execution**: same specification, same data, same rows
//! - **Pseudonymized output**: sensitive values never leave unmasked
//!
//! # Example
//!
//! ```no_run
//! use sieve::{MockProvider, Sieve, SieveConfig};
//!
//! let sieve = Sieve::open(&SieveConfig::default())
//!     .unwrap()
//!     .with_llm(MockProvider::new().with_response(r#"{"limit": 5}"#));
//!
//! let response = sieve.ask("Show me five sales");
//! println!("{}", response.answer);
//! ```

pub mod censor;
pub mod engine;
pub mod error;
pub mod input;
pub mod llm;
pub mod profile;
pub mod response;
pub mod schema;
pub mod spec;

mod sieve;

pub use crate::sieve::{DEFAULT_PORT, DatasetStats, Sieve, SieveConfig, StatEntry};
pub use censor::{CensorKind, CensoringService};
pub use engine::{ExecutionEngine, ExecutionResult, Row};
pub use error::{FieldViolation, Result, SieveError};
pub use input::{Dataset, DatasetLoader, SourceMetadata, Value};
pub use llm::{
    AnthropicProvider, LlmChoice, LlmConfig, MockProvider, OllamaProvider, OpenAIProvider,
    SpecGenerator,
};
pub use profile::Profile;
pub use response::{Confidence, QueryResponse, ResponseBuilder};
pub use schema::{AggregateFn, ColumnSchema, ColumnType, DatasetSchema, FilterOp, SortOrder};
pub use spec::{QuerySpec, SpecParser};
