//! Application state for the web server.

use std::sync::Arc;

use prepper::Workspace;
use tokio::sync::{Mutex, MutexGuard};

use super::error::ApiError;

/// Shared application state.
///
/// Mutating calls go through [`AppState::mutate`], which refuses to queue
/// behind an operation already in flight.
#[derive(Clone)]
pub struct AppState {
    workspace: Arc<Mutex<Workspace>>,
}

impl AppState {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
        }
    }

    /// Lock the workspace for calls that never reach the analysis service.
    pub async fn lock(&self) -> MutexGuard<'_, Workspace> {
        self.workspace.lock().await
    }

    /// Run `f` on a blocking thread with exclusive access to the workspace.
    ///
    /// Fails with [`ApiError::Busy`] if another call holds the workspace.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Workspace) -> prepper::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut guard = Arc::clone(&self.workspace)
            .try_lock_owned()
            .map_err(|_| ApiError::Busy)?;

        tokio::task::spawn_blocking(move || f(&mut guard))
            .await
            .map_err(|e| ApiError::Internal(format!("Worker failed: {}", e)))?
            .map_err(ApiError::from)
    }
}
