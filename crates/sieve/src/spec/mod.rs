//! Query specifications: the structured form of a user's question.

mod parser;
mod query;

pub use parser::SpecParser;
pub use query::{FilterClause, FilterValue, QuerySpec, SortClause};
