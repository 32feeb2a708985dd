//! Dataset loading and typed cell values.

mod parser;
mod source;
mod value;

pub use parser::{DatasetLoader, LoaderConfig};
pub use source::{Dataset, SourceMetadata};
pub use value::{Value, format_number, parse_date};

pub(crate) use value::parse_date_parts;
