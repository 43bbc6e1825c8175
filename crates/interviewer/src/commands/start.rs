//! Start command - launches the interview server.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use interviewer_config::InterviewerConfig;
use interviewer_server::{AppState, Server, ServerConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file and environment values.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Storage folder recordings are uploaded into (overrides config)
    #[arg(long)]
    pub folder: Option<String>,

    /// Enable the global API rate limiter
    #[arg(long)]
    pub rate_limit: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Fold CLI overrides into the loaded configuration.
fn apply_overrides(config: &mut InterviewerConfig, args: &StartArgs) {
    let mut server = config.server();
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(ref bind) = args.bind {
        server.bind = bind.clone();
    }
    if args.rate_limit {
        server.rate_limiting = true;
    }
    config.server = Some(server);

    if let Some(ref folder) = args.folder {
        let mut storage = config.storage();
        storage.folder_id = Some(folder.clone());
        config.storage = Some(storage);
    }
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let loaded = super::load(args.config.as_deref())?;

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    let mut config = loaded.config;
    apply_overrides(&mut config, &args);

    // ── Build server ────────────────────────────────────────────────────

    let server_config = ServerConfig::from_config(&config)?;
    if server_config.storage_folder_id.is_none() {
        tracing::warn!("No storage folder configured; uploads will be rejected");
    }

    let state = AppState::from_storage_config(server_config, &config.storage())?;
    let server = Server::new(state);

    println!("Interviewer listening on http://{}", server.bind_address());
    tracing::info!(
        addr = %server.bind_address(),
        gateway = server.state().uploads.name(),
        "Server starting"
    );

    server.run().await?;
    Ok(())
}
