//! Session lifecycle: one dataset, its transformation history, and the
//! derived state the presentation layer reads.

mod session;
mod workspace;

pub use session::{Session, SessionId};
pub use workspace::{Workspace, WorkspaceStatus};
