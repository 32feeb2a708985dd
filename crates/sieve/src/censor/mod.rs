//! Pseudonymization of sensitive column values.
//!
//! A pseudonym is a type prefix followed by a truncated, uppercased SHA-256
//! digest of the value's trimmed string form, e.g. `DEALER_3F2A9C`. Digests
//! are truncated to 6 or 8 hex characters, so collisions are possible though
//! unlikely; the first mapping wins and a warning is logged.

mod kind;
mod service;

pub use kind::CensorKind;
pub use service::{CensoringService, PseudonymStats, pseudonym_for};
