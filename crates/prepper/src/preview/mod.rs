//! Display projection of service tables and delimited export.

mod export;
mod projection;

pub use export::to_delimited;
pub use projection::{PreviewRow, PreviewTable};
