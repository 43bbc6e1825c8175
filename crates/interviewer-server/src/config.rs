//! Server configuration.

use std::net::SocketAddr;

use interviewer_config::InterviewerConfig;

/// Default max body size for REST requests (100 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = interviewer_config::DEFAULT_MAX_BODY_SIZE;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Enable rate limiting.
    pub rate_limiting: bool,

    /// Rate limit: requests per minute for API endpoints.
    pub api_rpm: u32,

    /// Enable request logging.
    pub request_logging: bool,

    /// CORS allowed origins (empty = any origin).
    pub cors_origins: Vec<String>,

    /// Maximum REST request body size in bytes.
    /// Recordings larger than this are rejected. Default: 100 MB.
    pub max_body_size: usize,

    /// Storage folder recordings are uploaded into.
    /// Uploads fail with a configuration error while this is `None`.
    pub storage_folder_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], interviewer_config::DEFAULT_PORT)),
            rate_limiting: false,
            api_rpm: interviewer_config::DEFAULT_API_RPM,
            request_logging: true,
            cors_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            storage_folder_id: None,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded file/env configuration.
    pub fn from_config(config: &InterviewerConfig) -> crate::Result<Self> {
        let server = config.server();
        let storage = config.storage();

        let bind_address = server.socket_addr().map_err(|e| {
            crate::ServerError::Config(format!(
                "invalid bind address {}:{}: {}",
                server.bind, server.port, e
            ))
        })?;

        Ok(Self {
            bind_address,
            rate_limiting: server.rate_limiting,
            api_rpm: server.api_rpm,
            request_logging: server.request_logging,
            cors_origins: server.cors_origins,
            max_body_size: server.max_body_size,
            storage_folder_id: storage.folder_id,
        })
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Enable or disable rate limiting.
    pub fn with_rate_limiting(mut self, enabled: bool) -> Self {
        self.rate_limiting = enabled;
        self
    }

    /// Set the API rate limit (requests per minute).
    pub fn with_api_rpm(mut self, rpm: u32) -> Self {
        self.api_rpm = rpm;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Set the maximum REST request body size.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the storage folder for uploaded recordings.
    pub fn with_storage_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.storage_folder_id = Some(folder_id.into());
        self
    }
}
