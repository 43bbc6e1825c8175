//! Configuration for the interviewer service.
//!
//! Provides TOML-based configuration with:
//! - Config file layering (XDG user config + project-local overrides)
//! - `.env` loading and environment variable overrides
//! - Storage token resolution (env var or config value, then a raw-token file)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, check_google_credentials, load_config, load_config_file, load_config_with_options, load_dotenv,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
