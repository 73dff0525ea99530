//! Dataset input and CSV parsing.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig};
pub use source::{DataTable, Dataset};
