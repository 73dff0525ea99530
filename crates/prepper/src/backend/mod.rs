//! Analysis service integration.
//!
//! The workspace talks to whatever computes transformations and statistics
//! through [`AnalysisService`]:
//!
//! - [`HttpService`] - the remote service over HTTP
//! - [`LocalService`] - an in-process implementation, no server needed
//! - [`MockService`] - scripted responses for tests

mod http;
mod local;
mod mock;
mod service;

pub use http::{DEFAULT_BASE_URL, HttpService};
pub use local::LocalService;
pub use mock::MockService;
pub use service::{AnalysisService, TablePayload, UndoPayload};
