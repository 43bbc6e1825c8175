//! Application state shared across handlers.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use interviewer_session::{Error as SessionError, SessionCache, SessionKey, SessionRecord};

use crate::config::ServerConfig;
use crate::ratelimit::{SharedRateLimiter, create_rate_limiter};
use crate::upload::{HttpUploadGateway, SharedGateway, UploadGateway};

/// Message for links that do not name an open interview.
pub const INVALID_LINK: &str = "Invalid interview link";

/// Suffix of the cache key holding a session's upload list.
const UPLOADS_SUFFIX: &str = ":uploads";

/// Cache key under which uploads for `session_key` are tracked.
pub fn uploads_key(session_key: &str) -> String {
    format!("{session_key}{UPLOADS_SUFFIX}")
}

/// Application state shared across all handlers.
///
/// Built once at startup. The session cache inside is the only copy of
/// interview state for the process.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Interview sessions and per-session upload lists.
    pub sessions: SessionCache,

    /// Where recordings are forwarded.
    pub uploads: SharedGateway,

    /// API rate limiter.
    pub limiter: SharedRateLimiter,
}

impl AppState {
    /// Create a new application state with a fresh cache.
    pub fn new(config: ServerConfig, uploads: impl UploadGateway + 'static) -> Self {
        Self::with_cache(config, SessionCache::new(), Arc::new(uploads))
    }

    /// Create application state around an existing cache and gateway.
    pub fn with_cache(config: ServerConfig, sessions: SessionCache, uploads: SharedGateway) -> Self {
        let limiter = create_rate_limiter(config.api_rpm);
        Self {
            config: Arc::new(config),
            sessions,
            uploads,
            limiter,
        }
    }

    /// Create state with the HTTP gateway built from storage config.
    pub fn from_storage_config(
        config: ServerConfig,
        storage: &interviewer_config::StorageConfig,
    ) -> crate::Result<Self> {
        let gateway = HttpUploadGateway::from_config(storage)?;
        Ok(Self::new(config, gateway))
    }

    /// Issue a new interview link for `questions`.
    pub fn create_interview(&self, questions: Vec<String>) -> SessionKey {
        let key = SessionKey::generate();
        let count = questions.len();
        self.sessions.set(key.as_str(), SessionRecord::new(questions));
        info!(session = %key, questions = count, "Interview created");
        key
    }

    /// Look up the interview behind a link.
    pub fn fetch_interview(&self, key: &str) -> Option<SessionRecord> {
        self.sessions.get_record(key)
    }

    /// Check that `key` names an interview.
    pub fn interview_exists(&self, key: &str) -> bool {
        self.sessions.has_record(key)
    }

    /// Remove an interview and its upload list.
    ///
    /// Returns `true` if the interview existed.
    pub fn close_interview(&self, key: &str) -> bool {
        if !self.interview_exists(key) {
            return false;
        }
        self.sessions.delete(key);
        self.sessions.delete(&uploads_key(key));
        debug!(session = %key, "Interview closed");
        true
    }

    /// Record that an upload happened for `key`.
    ///
    /// Fails with `NotFound` if the interview was closed in the meantime;
    /// no upload list is left behind in that case.
    pub fn record_upload(&self, key: &str, metadata: Value) -> crate::Result<usize> {
        self.sessions
            .append_to_list_for(key, &uploads_key(key), metadata)
            .map_err(|e| match e {
                SessionError::NotFound(_) => {
                    crate::ServerError::NotFound(INVALID_LINK.to_string())
                }
                other => crate::ServerError::Internal(other.to_string()),
            })
    }

    /// Uploads recorded for `key`, oldest first.
    pub fn uploads_for(&self, key: &str) -> Vec<Value> {
        self.sessions.get_list(&uploads_key(key)).unwrap_or_default()
    }
}
