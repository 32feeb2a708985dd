//! API request handlers.

mod ask;
mod health;
mod stats;

pub use ask::*;
pub use health::*;
pub use stats::*;
