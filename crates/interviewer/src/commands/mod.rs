//! CLI command handlers.

pub mod config;
pub mod start;

use std::path::Path;

use anyhow::Result;
use interviewer_config::{ConfigSource, LoadedConfig};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Load configuration from an explicit file or by discovery.
///
/// Environment overrides apply in both cases.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let Some(path) = explicit else {
        return Ok(interviewer_config::load_config(None)?);
    };

    let lookup = |var: &str| std::env::var(var).ok();
    let mut config = interviewer_config::load_config_file(path)?;
    config.apply_env(lookup)?;

    let mut warnings = Vec::new();
    interviewer_config::check_google_credentials(lookup, &mut warnings);
    Ok(LoadedConfig {
        config,
        sources: vec![ConfigSource {
            path: path.to_path_buf(),
            loaded: true,
        }],
        warnings,
    })
}
