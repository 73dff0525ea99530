//! Prepper: an undoable cleaning pipeline for tabular datasets.
//!
//! A [`Workspace`] binds one dataset to a session on an analysis service and
//! lets the user clean it step by step:
//!
//! - **Transformations** (impute, encode, scale, drop) are applied by the
//!   service and kept on a linear undo stack
//! - **Column statistics** are refreshed after every step and cached as one
//!   atomic snapshot, with a health ranking for default chart columns
//! - **Recommendations** from the statistics can be dismissed or applied with
//!   one click; dismissals are reconciled on every refresh
//! - **Preview** rows are projected for display and exported as text
//!
//! # Example
//!
//! ```no_run
//! use prepper::{Dataset, PrepperConfig, Workspace};
//!
//! let mut workspace = Workspace::from_config(PrepperConfig::default()).unwrap();
//! workspace.open(Dataset::from_path("data.csv").unwrap()).unwrap();
//!
//! for rec in workspace.visible_recommendations() {
//!     println!("{}: {}", rec.column, rec.text);
//! }
//! println!("{}", workspace.export());
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod input;
pub mod preview;
pub mod recommendation;
pub mod session;
pub mod stats;
pub mod transform;

pub use backend::{AnalysisService, HttpService, LocalService, MockService};
pub use config::{BackendConfig, PrepperConfig};
pub use error::{PrepError, Result};
pub use input::{DataTable, Dataset};
pub use preview::PreviewTable;
pub use recommendation::{DismissalSet, Recommendation, RecommendationKind};
pub use session::{Session, SessionId, Workspace, WorkspaceStatus};
pub use stats::{ColumnStat, Heatmap, StatsMap, VizKind};
pub use transform::{TransformAction, TransformRequest, Transformation};
