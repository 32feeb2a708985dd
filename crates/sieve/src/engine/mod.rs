//! Deterministic execution of validated specifications.
//!
//! The pipeline is filter, then aggregate or project, then sort, then limit.
//! Nothing here talks to a language model or touches the censoring table.

mod aggregate;
mod executor;
mod filter;
mod sort;

pub use aggregate::COUNT_COLUMN;
pub use executor::{ExecutionEngine, ExecutionResult, Row};

use crate::error::SieveError;

pub(crate) fn execution_error(message: impl Into<String>) -> SieveError {
    SieveError::Execution(message.into())
}
