//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [server]     # listener, CORS, limits
//! [storage]    # remote upload target and credentials
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default port (the web client expects the API on 5000).
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default max request body size (100 MB, recordings are large).
pub const DEFAULT_MAX_BODY_SIZE: usize = 100 * 1024 * 1024;

/// Default API rate limit, requests per minute.
pub const DEFAULT_API_RPM: u32 = 120;

/// Default upload endpoint (Drive v3 multipart upload).
pub const DEFAULT_STORAGE_ENDPOINT: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id";

/// Default timeout for a single upload.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 300;

// Environment overrides
pub const ENV_BIND: &str = "INTERVIEWER_BIND";
pub const ENV_PORT: &str = "INTERVIEWER_PORT";
pub const ENV_STORAGE_ENDPOINT: &str = "INTERVIEWER_STORAGE_ENDPOINT";
pub const ENV_STORAGE_TOKEN: &str = "INTERVIEWER_STORAGE_TOKEN";
pub const ENV_FOLDER_ID: &str = "GOOGLE_DRIVE_FOLDER_ID";
/// File holding a raw bearer token for the storage API.
pub const ENV_CREDENTIALS_FILE: &str = "INTERVIEWER_CREDENTIALS_FILE";
/// Service-account key path used by Google client libraries. Not read.
pub const ENV_GOOGLE_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewerConfig {
    /// HTTP server settings.
    pub server: Option<ServerConfig>,

    /// Remote storage settings.
    pub storage: Option<StorageConfig>,
}

impl InterviewerConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not merged field by field.
    pub fn merge(&mut self, other: InterviewerConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.storage.is_some() {
            self.storage = other.storage;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Storage section, or defaults.
    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get(ENV_BIND) {
            self.server.get_or_insert_with(Default::default).bind = bind;
        }
        if let Some(port) = get(ENV_PORT) {
            let parsed = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
            self.server.get_or_insert_with(Default::default).port = parsed;
        }

        if let Some(endpoint) = get(ENV_STORAGE_ENDPOINT) {
            self.storage.get_or_insert_with(Default::default).endpoint = endpoint;
        }
        if let Some(folder) = get(ENV_FOLDER_ID) {
            self.storage.get_or_insert_with(Default::default).folder_id = Some(folder);
        }
        if let Some(path) = get(ENV_CREDENTIALS_FILE) {
            self.storage
                .get_or_insert_with(Default::default)
                .credentials_path = Some(PathBuf::from(path));
        }
        if let Some(token) = get(ENV_STORAGE_TOKEN) {
            self.storage.get_or_insert_with(Default::default).access_token = Some(token);
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// CORS allowed origins (empty = any origin).
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Enable rate limiting.
    pub rate_limiting: bool,
    /// API rate limit: requests per minute.
    pub api_rpm: u32,
    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cors_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            rate_limiting: false,
            api_rpm: DEFAULT_API_RPM,
            request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Parse `bind:port` into a socket address.
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Remote storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Upload endpoint URL.
    pub endpoint: String,
    /// Destination folder for recordings. Uploads are refused without one.
    pub folder_id: Option<String>,
    /// File holding a raw bearer token for the storage API.
    pub credentials_path: Option<PathBuf>,
    /// Bearer token given directly (prefer the env var or credentials file).
    pub access_token: Option<String>,
    /// Timeout for a single upload, in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
            folder_id: None,
            credentials_path: None,
            access_token: None,
            timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
        }
    }
}

impl StorageConfig {
    /// Upload timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the bearer token.
    ///
    /// Order: `access_token`, then the trimmed contents of
    /// `credentials_path`. `Ok(None)` when neither is set. A file holding a
    /// JSON key (e.g. a service-account key) is rejected.
    pub fn resolve_token(&self) -> Result<Option<String>> {
        if let Some(token) = &self.access_token {
            return Ok(Some(token.clone()));
        }

        let Some(path) = &self.credentials_path else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Credentials {
            path: path.display().to_string(),
            source: e,
        })?;
        let token = contents.trim();

        if let Ok(key) = serde_json::from_str::<KeyFile>(token) {
            return Err(ConfigError::UnsupportedCredentials {
                path: path.display().to_string(),
                kind: key.kind.unwrap_or_else(|| "unknown".to_string()),
            });
        }

        Ok((!token.is_empty()).then(|| token.to_string()))
    }
}

/// Shape of a JSON key file, only as far as needed to recognize one.
#[derive(Deserialize)]
struct KeyFile {
    #[serde(rename = "type")]
    kind: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
