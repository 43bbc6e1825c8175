//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/interviewer/config.toml` (XDG user config)
//! 2. `./interviewer.toml` (project-local)
//! 3. Environment variables (after `.env` is loaded)
//! 4. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use crate::{
    ConfigError, ENV_CREDENTIALS_FILE, ENV_GOOGLE_CREDENTIALS, ENV_STORAGE_TOKEN, InterviewerConfig,
    Result,
};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "interviewer.toml";

/// Default config filename within XDG config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "interviewer";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "INTERVIEWER_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: InterviewerConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (e.g., plaintext tokens).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load a `.env` file from the working directory, if there is one.
///
/// Returns the path that was loaded. Variables already set in the process
/// environment win over the file.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load configuration from all file layers, then apply process environment
/// overrides.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    let mut loaded = load_config_with_options(project_dir, None)?;
    let lookup = |var: &str| std::env::var(var).ok();
    loaded.config.apply_env(lookup)?;
    check_google_credentials(lookup, &mut loaded.warnings);
    Ok(loaded)
}

/// Load configuration files only, with explicit control over the user
/// config directory.
///
/// `config_dir` overrides both `INTERVIEWER_CONFIG_DIR` and the platform
/// default. Environment overrides are not applied.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = InterviewerConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    // 1. User config
    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => xdg_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    // 2. Project-local config
    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    check_plaintext_token(&config, &mut warnings);

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<InterviewerConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    InterviewerConfig::from_toml(&contents)
}

/// Get the XDG config file path for interviewer.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the XDG config directory for interviewer.
///
/// Checks `INTERVIEWER_CONFIG_DIR` first, then falls back to the platform
/// default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load a config file and merge it into the existing config.
///
/// A missing file is skipped; a malformed one becomes a warning.
fn load_layer(
    config: &mut InterviewerConfig,
    path: &Path,
    warnings: &mut Vec<String>,
) -> ConfigSource {
    if !path.is_file() {
        return ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    match load_config_file(path) {
        Ok(layer) => {
            config.merge(layer);
            ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            }
        }
    }
}

fn check_plaintext_token(config: &InterviewerConfig, warnings: &mut Vec<String>) {
    if let Some(ref storage) = config.storage
        && storage.access_token.is_some()
    {
        warnings.push(
            "[storage] contains a plaintext access_token. \
             Consider INTERVIEWER_STORAGE_TOKEN or INTERVIEWER_CREDENTIALS_FILE instead."
                .to_string(),
        );
    }
}

/// Warn when a service-account key path is set; uploads need a raw token.
pub fn check_google_credentials<F>(lookup: F, warnings: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    if lookup(ENV_GOOGLE_CREDENTIALS).is_some_and(|v| !v.trim().is_empty()) {
        warnings.push(format!(
            "{ENV_GOOGLE_CREDENTIALS} is set but not used. Service-account keys are \
             not supported; set {ENV_STORAGE_TOKEN} or point {ENV_CREDENTIALS_FILE} \
             at a file holding an access token."
        ));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
