//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },

    /// Failed to read the storage credentials file.
    #[error("failed to read credentials file '{path}': {source}")]
    Credentials {
        path: String,
        source: std::io::Error,
    },

    /// The credentials file holds a JSON key rather than an access token.
    #[error(
        "credentials file '{path}' holds a {kind} JSON key; \
         it must contain a raw access token"
    )]
    UnsupportedCredentials { path: String, kind: String },
}
