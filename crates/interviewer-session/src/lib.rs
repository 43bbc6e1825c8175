//! In-memory session state for interview links.
//!
//! This crate provides the state that backs every interview link:
//! - [`SessionKey`] generation (random, 32 lowercase hex characters)
//! - [`SessionCache`], a process-wide key/value store holding interview
//!   records, growable lists and arbitrary JSON values
//!
//! One cache is built at startup and handed to every request handler.
//! Cloning a [`SessionCache`] clones the handle, not the data.
//!
//! # Example
//!
//! ```rust,ignore
//! use interviewer_session::{CacheValue, SessionCache, SessionKey, SessionRecord};
//!
//! let cache = SessionCache::new();
//! let key = SessionKey::generate();
//! cache.set(key.as_str(), SessionRecord::new(vec!["Tell us about yourself".into()]));
//! assert!(cache.has(key.as_str()));
//! ```

mod cache;
mod error;
mod keygen;
mod value;

pub use cache::{CacheStats, SessionCache};
pub use error::{Error, Result};
pub use keygen::{KEY_LENGTH, SessionKey, generate_key};
pub use value::{CacheValue, SessionRecord};
