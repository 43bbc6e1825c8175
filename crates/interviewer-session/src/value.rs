//! Values stored in the session cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Interview session record created when a link is issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Questions in the order they are asked.
    pub questions: Vec<String>,

    /// When the link was issued.
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record stamped with the current time.
    pub fn new(questions: Vec<String>) -> Self {
        Self {
            questions,
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp.
    pub fn with_created_at(mut self, ts: DateTime<Utc>) -> Self {
        self.created_at = ts;
        self
    }
}

/// A value held under a cache key.
///
/// The shape decides which operations apply: list operations only accept
/// [`CacheValue::List`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheValue {
    /// Structured interview record.
    Record(SessionRecord),

    /// Ordered, growable list.
    List(Vec<Value>),

    /// Anything else.
    Other(Value),
}

impl CacheValue {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheValue::Record(_) => "record",
            CacheValue::List(_) => "list",
            CacheValue::Other(_) => "other",
        }
    }

    pub fn as_record(&self) -> Option<&SessionRecord> {
        match self {
            CacheValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            CacheValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, CacheValue::List(_))
    }
}

impl From<SessionRecord> for CacheValue {
    fn from(record: SessionRecord) -> Self {
        CacheValue::Record(record)
    }
}

impl From<Vec<Value>> for CacheValue {
    fn from(items: Vec<Value>) -> Self {
        CacheValue::List(items)
    }
}

/// JSON arrays become lists so they can be used with the list operations.
impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => CacheValue::List(items),
            other => CacheValue::Other(other),
        }
    }
}
