//! Response assembly: censoring, statistics and a plain-language answer.

mod builder;
mod statistics;

pub use builder::{Confidence, QueryResponse, ResponseBuilder, ResponseError, SourceRecord};
pub use statistics::{ColumnStatistics, NumericSummary, ResultStatistics};

pub(crate) use statistics::column_statistics;
