//! CLI command implementations.

pub mod ask;
pub mod censor;
pub mod profiles;
pub mod reveal;
pub mod serve;
pub mod validate;
