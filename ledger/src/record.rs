// ledger/src/record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commit height at which a key was last written. Starts at 1; a key that was
/// never written has no version.
pub type Version = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One entry of a key's history log. Deletes carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    pub tx_id: String,
    pub value: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
}

impl KeyModification {
    pub fn write(tx_id: &str, value: Vec<u8>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id: tx_id.to_string(),
            value,
            timestamp,
            is_delete: false,
        }
    }

    pub fn delete(tx_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id: tx_id.to_string(),
            value: Vec::new(),
            timestamp,
            is_delete: true,
        }
    }
}

/// Range bounds follow the usual world-state convention: `start` inclusive,
/// `end` exclusive, and an empty string leaves that side open.
pub(crate) fn in_range(key: &str, start: &str, end: &str) -> bool {
    key >= start && (end.is_empty() || key < end)
}
