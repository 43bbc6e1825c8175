//! Error types for session cache operations.

/// Error type for session cache operations.
///
/// None of these leave the cache in a modified state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Nothing is stored under the key.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A list operation was attempted on a key holding a non-list value.
    #[error("Value at {0} is not a list")]
    NotAList(String),

    /// The list at the key does not contain the value.
    #[error("Value not found in list at {0}")]
    ValueNotInList(String),
}

/// Result type for session cache operations.
pub type Result<T> = std::result::Result<T, Error>;
