//! Client for the analysis service's HTTP API.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{PrepError, Result};
use crate::input::Dataset;
use crate::session::{Session, SessionId};
use crate::stats::StatsMap;
use crate::transform::TransformRequest;

use super::service::{AnalysisService, TablePayload, UndoPayload};

/// Default service address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Deserialize)]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Deserialize)]
struct StatsResponse {
    stats: StatsMap,
}

/// The endpoints used, each with its own rejection error.
#[derive(Debug, Clone, Copy)]
enum Endpoint {
    CreateSession,
    Preview,
    Apply,
    Undo,
    ColumnStats,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::CreateSession => "create_session",
            Endpoint::Preview => "preview",
            Endpoint::Apply => "apply_transformation",
            Endpoint::Undo => "undo",
            Endpoint::ColumnStats => "column_stats",
        }
    }

    fn rejected(&self, dataset: &Dataset, message: String) -> PrepError {
        match self {
            Endpoint::CreateSession => PrepError::SessionCreation {
                dataset: dataset.name.clone(),
                message,
            },
            Endpoint::Apply => PrepError::Transformation(message),
            Endpoint::Undo => PrepError::NothingToUndo(message),
            Endpoint::Preview | Endpoint::ColumnStats => {
                PrepError::Backend(format!("/{} rejected: {}", self.path(), message))
            }
        }
    }
}

/// Talks to the service over multipart form posts.
///
/// Every request carries the dataset file, as the service expects.
pub struct HttpService {
    client: Client,
    base_url: String,
}

impl HttpService {
    /// Client for `base_url` with no request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Client with an optional per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PrepError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    fn file_form(dataset: &Dataset) -> Result<Form> {
        let part = Part::bytes(dataset.bytes.clone())
            .file_name(dataset.name.clone())
            .mime_str("text/csv")
            .map_err(|e| PrepError::Backend(format!("Invalid upload part: {}", e)))?;
        Ok(Form::new().part("file", part))
    }

    fn session_form(session: &Session) -> Result<Form> {
        Ok(Self::file_form(&session.dataset)?.text("session_id", session.id.to_string()))
    }

    fn post<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        dataset: &Dataset,
        form: Form,
        rows: Option<usize>,
    ) -> Result<T> {
        let mut request = self.client.post(self.url(endpoint)).multipart(form);
        if let Some(rows) = rows {
            request = request.query(&[("rows", rows)]);
        }

        debug!(endpoint = endpoint.path(), "Calling analysis service");
        let response = request
            .send()
            .map_err(|e| PrepError::Backend(format!("Request to /{} failed: {}", endpoint.path(), e)))?;

        if !response.status().is_success() {
            return Err(endpoint.rejected(dataset, error_message(response)));
        }

        response.json().map_err(|e| {
            PrepError::Backend(format!(
                "Failed to parse /{} response: {}",
                endpoint.path(),
                e
            ))
        })
    }
}

/// Prefer the service's `detail` field; fall back to the raw body.
fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }));

    match detail {
        Some(detail) => format!("{} ({})", detail, status),
        None if body.is_empty() => status.to_string(),
        None => format!("{} ({})", body, status),
    }
}

impl AnalysisService for HttpService {
    fn name(&self) -> &str {
        "http"
    }

    fn create_session(&self, dataset: &Dataset) -> Result<SessionId> {
        let response: CreateSessionResponse = self.post(
            Endpoint::CreateSession,
            dataset,
            Self::file_form(dataset)?,
            None,
        )?;
        Ok(SessionId::new(response.session_id))
    }

    fn preview(&self, session: &Session, row_limit: usize) -> Result<TablePayload> {
        self.post(
            Endpoint::Preview,
            &session.dataset,
            Self::file_form(&session.dataset)?,
            Some(row_limit),
        )
    }

    fn apply_transformation(
        &self,
        session: &Session,
        request: &TransformRequest,
        row_limit: usize,
    ) -> Result<TablePayload> {
        let form = Self::session_form(session)?
            .text("action", request.action().as_str())
            .text("columns", serde_json::to_string(request.columns())?)
            .text("params", request.params().to_string());

        self.post(Endpoint::Apply, &session.dataset, form, Some(row_limit))
    }

    fn undo(&self, session: &Session, row_limit: usize) -> Result<UndoPayload> {
        self.post(
            Endpoint::Undo,
            &session.dataset,
            Self::session_form(session)?,
            Some(row_limit),
        )
    }

    fn column_stats(&self, session: &Session) -> Result<StatsMap> {
        let response: StatsResponse = self.post(
            Endpoint::ColumnStats,
            &session.dataset,
            Self::session_form(session)?,
            None,
        )?;
        Ok(response.stats)
    }

    /// The service has no endpoint for ending a session; it expires them
    /// on its own.
    fn close_session(&self, _session: &Session) -> Result<()> {
        Ok(())
    }
}
