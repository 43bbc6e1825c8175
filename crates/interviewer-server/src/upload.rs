//! Forwarding recordings to remote storage.
//!
//! Handlers only see [`UploadGateway`]; the HTTP implementation talks to a
//! Drive-style multipart upload endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

use interviewer_config::StorageConfig;

/// Error returned by an upload gateway.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The provider answered but the response could not be understood.
    #[error("invalid response from storage: {0}")]
    InvalidResponse(String),

    /// Any other gateway failure.
    #[error("{0}")]
    Backend(String),
}

/// A recording to store remotely.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Object name at the destination.
    pub file_name: String,

    /// Destination folder.
    pub folder_id: String,

    /// Content type of `data`.
    pub mime_type: String,

    /// The recording itself.
    pub data: Bytes,
}

/// Stores a byte payload remotely and returns the remote object id.
#[async_trait]
pub trait UploadGateway: Send + Sync {
    /// Upload and return the id assigned by the provider.
    async fn upload(&self, request: UploadRequest) -> Result<String, UploadError>;

    /// Get the name of this gateway.
    fn name(&self) -> &str;
}

/// A gateway that can be shared across handlers.
pub type SharedGateway = Arc<dyn UploadGateway>;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// Uploads recordings with a multipart POST of JSON metadata plus media.
#[derive(Debug, Clone)]
pub struct HttpUploadGateway {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpUploadGateway {
    /// Create a gateway for `endpoint`, optionally bearer-authenticated.
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
        })
    }

    /// Build from the `[storage]` config section, resolving credentials.
    pub fn from_config(config: &StorageConfig) -> crate::Result<Self> {
        let token = config.resolve_token()?;
        if token.is_none() {
            tracing::warn!("No storage credentials configured; uploads will be unauthenticated");
        }
        Ok(Self::new(&config.endpoint, token, config.timeout())?)
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UploadGateway for HttpUploadGateway {
    async fn upload(&self, request: UploadRequest) -> Result<String, UploadError> {
        let size = request.data.len();
        let metadata = json!({
            "name": request.file_name,
            "parents": [request.folder_id],
        });

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string()).mime_str("application/json")?,
            )
            .part(
                "file",
                Part::stream(request.data)
                    .file_name(request.file_name.clone())
                    .mime_str(&request.mime_type)?,
            );

        let mut builder = self.client.post(&self.endpoint).multipart(form);
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }

        debug!(file_name = %request.file_name, size, "Sending upload to storage");
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let file_id = body
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| UploadError::InvalidResponse("missing 'id' field".to_string()))?;

        info!(
            file_id = %file_id,
            folder_id = %request.folder_id,
            size,
            "Recording uploaded"
        );

        Ok(file_id)
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// A gateway for tests: records every request and answers with sequential
/// ids, or always fails.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockGateway {
    failure: Option<String>,
    request_log: std::sync::Mutex<Vec<UploadRequest>>,
}

#[cfg(test)]
impl MockGateway {
    /// Create a gateway that accepts every upload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway that rejects every upload with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Get all requests that were made to this gateway.
    pub fn requests(&self) -> Vec<UploadRequest> {
        self.request_log.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl UploadGateway for MockGateway {
    async fn upload(&self, request: UploadRequest) -> Result<String, UploadError> {
        let mut log = self.request_log.lock().unwrap();
        log.push(request);

        match self.failure {
            Some(ref message) => Err(UploadError::Backend(message.clone())),
            None => Ok(format!("mock-file-{}", log.len())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
