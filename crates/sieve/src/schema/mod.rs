//! Schema types describing the columns a query may touch.

mod column;
mod table;
mod types;

pub use column::ColumnSchema;
pub use table::{DEFAULT_QUERY_LIMIT, DEFAULT_SOURCES_LIMIT, DatasetSchema, MAX_QUERY_LIMIT};
pub use types::{AggregateFn, ColumnType, FilterOp, SortOrder};
