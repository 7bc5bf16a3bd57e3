//! REST client for the club API.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::RemoteStore;
use crate::error::{Error, Result};
use crate::models::{EntityKind, Record, RecordId};
use crate::util::{compact_text, is_http_url, normalize_text_option};

#[derive(Debug, Error)]
enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned HTTP {0}: {1}")]
    Status(u16, String),
    #[error("API rejected request: {0}")]
    Rejected(String),
    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),
}

type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Response body shared by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// [`RemoteStore`] over the REST API (`POST/GET /api/<kind>s`,
/// `PUT/DELETE /api/<kind>s/:id`).
#[derive(Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    /// Build a client for `base_url`.
    ///
    /// No timeout is applied unless one is given.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|error| Error::Config(format!("failed to build HTTP client: {error}")))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}{}", self.base_url, kind.remote_path())
    }

    /// The id is encoded as a single path segment.
    fn record_url(&self, kind: EntityKind, id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.collection_url(kind),
            urlencoding::encode(id.as_str())
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> RemoteResult<Option<T>> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|error| RemoteError::InvalidPayload(error.to_string()))?;
        if !envelope.success {
            return Err(RemoteError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "success=false without error message".to_string()),
            ));
        }
        Ok(envelope.data)
    }

    async fn try_list(&self, kind: EntityKind) -> RemoteResult<Vec<Record>> {
        self.send::<Vec<Record>>(self.client.get(self.collection_url(kind)))
            .await?
            .ok_or_else(|| RemoteError::InvalidPayload("list response had no data".to_string()))
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn create(&self, kind: EntityKind, record: &Record) -> bool {
        let request = self.client.post(self.collection_url(kind)).json(record);
        report(kind, "create", self.send::<Value>(request).await).is_some()
    }

    async fn update(&self, kind: EntityKind, record: &Record) -> bool {
        let request = self
            .client
            .put(self.record_url(kind, &record.id))
            .json(record);
        report(kind, "update", self.send::<Value>(request).await).is_some()
    }

    async fn list(&self, kind: EntityKind) -> Option<Vec<Record>> {
        report(kind, "list", self.try_list(kind).await)
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> bool {
        let request = self.client.delete(self.record_url(kind, id));
        report(kind, "delete", self.send::<Value>(request).await).is_some()
    }

    async fn ping(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!(%error, "Remote health check failed");
                false
            }
        }
    }
}

/// Collapse a remote result into "available or not", logging the cause.
fn report<T>(kind: EntityKind, operation: &str, result: RemoteResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::debug!(entity = %kind, operation, %error, "Remote unavailable");
            None
        }
    }
}

fn status_error(status: StatusCode, body: &str) -> RemoteError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        message: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|payload| payload.error.or(payload.message))
        .unwrap_or_else(|| compact_text(body));
    RemoteError::Status(status.as_u16(), message)
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("API base URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}
