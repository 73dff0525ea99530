//! JSON API over a single workspace.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
