//! HTTP API for the interviewer service.
//!
//! Issues interview links, serves the questions behind a link and forwards
//! recorded answers to remote storage.
//!
//! # Example
//!
//! ```ignore
//! use interviewer_server::{AppState, HttpUploadGateway, Server, ServerConfig};
//!
//! let gateway = HttpUploadGateway::new(endpoint, Some(token), timeout)?;
//! let config = ServerConfig::new()
//!     .with_bind_address("127.0.0.1:5000".parse()?)
//!     .with_storage_folder("drive-folder-id");
//!
//! let server = Server::new(AppState::new(config, gateway));
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod ratelimit;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use ratelimit::{rate_limit_middleware, request_logging_middleware};
pub use state::AppState;
pub use upload::{HttpUploadGateway, SharedGateway, UploadError, UploadGateway, UploadRequest};

use std::net::SocketAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The interviewer HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a server around pre-built application state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .nest("/api", self.api_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// API routes.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        Router::new()
            .route("/interviews", post(routes::create_interview_handler))
            .route(
                "/interviews/{id}",
                get(routes::get_interview_handler).delete(routes::delete_interview_handler),
            )
            .route("/interviews/{id}/uploads", get(routes::list_uploads_handler))
            .route("/upload/{id}", post(routes::upload_recording_handler))
            .layer(DefaultBodyLimit::max(self.state.config.max_body_size))
            .layer(self.cors_layer())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::rate_limit_middleware,
            ))
    }

    /// CORS for the browser client. Any origin unless origins are configured.
    fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);

        let origins = &self.state.config.cors_origins;
        if origins.is_empty() {
            return layer.allow_origin(Any);
        }

        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        layer.allow_origin(parsed)
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let router = self.router();

        if let Ok(addr) = listener.local_addr() {
            info!("Starting server on {}", addr);
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}
