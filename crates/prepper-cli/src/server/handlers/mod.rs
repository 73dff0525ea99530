//! API request handlers.

mod recommendations;
mod session;
mod stats;

pub use recommendations::*;
pub use session::*;
pub use stats::*;
