//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use interviewer_server::{
    AppState, Server, ServerConfig, UploadError, UploadGateway, UploadRequest,
};

/// Upload gateway that keeps uploads in memory.
#[derive(Default)]
pub struct StubGateway {
    counter: AtomicUsize,
    stored: Mutex<Vec<String>>,
}

impl StubGateway {
    /// File names of everything uploaded so far.
    pub fn stored(&self) -> Vec<String> {
        self.stored.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UploadGateway for StubGateway {
    async fn upload(&self, request: UploadRequest) -> Result<String, UploadError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut stored) = self.stored.lock() {
            stored.push(request.file_name);
        }
        Ok(format!("stub-file-{n}"))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server.
    pub client: Client,
    /// Gateway receiving uploads.
    pub gateway: Arc<StubGateway>,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with a storage folder configured.
    pub async fn start() -> Result<Self> {
        Self::start_with_config(ServerConfig::new().with_storage_folder("test-folder")).await
    }

    /// Start a new test server with the given config.
    pub async fn start_with_config(config: ServerConfig) -> Result<Self> {
        let addr = find_available_port().await?;
        let config = config.with_bind_address(addr).with_request_logging(false);

        let gateway = Arc::new(StubGateway::default());
        let state = AppState::with_cache(
            config,
            interviewer_session::SessionCache::new(),
            gateway.clone(),
        );

        let server = Server::new(state);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            gateway,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(format!("{}{}", self.base_url(), path))
    }

    /// Issue a link for `questions` and return its key.
    pub async fn create_interview(&self, questions: &[&str]) -> Result<String> {
        let resp = self
            .post("/api/interviews")
            .json(&serde_json::json!({ "questions": questions }))
            .send()
            .await?;
        anyhow::ensure!(resp.status().as_u16() == 201, "unexpected {}", resp.status());

        let body: serde_json::Value = resp.json().await?;
        body["unique_link"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing unique_link"))
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self.get("/health").send().await?;
        Ok(resp.status().is_success())
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
