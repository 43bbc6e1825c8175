//! Session key generation.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a generated session key in characters.
pub const KEY_LENGTH: usize = 32;

/// Opaque identifier for an interview session.
///
/// Generated keys are random version-4 UUIDs rendered as 32 lowercase hex
/// characters with no separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Generate a fresh random key.
    ///
    /// Draws 122 bits from the OS random source. If that source is
    /// unavailable the process cannot continue, so this panics inside `uuid`
    /// rather than returning an error.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether `s` has the lexical shape of a generated key.
    pub fn is_well_formed(s: &str) -> bool {
        s.len() == KEY_LENGTH && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}

/// Generate a fresh session key.
pub fn generate_key() -> SessionKey {
    SessionKey::generate()
}
