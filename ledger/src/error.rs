// ledger/src/error.rs
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    InvalidKey(String),
    KeyNotFound(String),
    /// A key read by the transaction was committed by someone else first.
    MvccConflict(String),
    Storage(String),
    Serialize(String),
    Deserialize(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "Invalid key: {:?}", key),
            Self::KeyNotFound(key) => write!(f, "Key not found: {}", key),
            Self::MvccConflict(key) => {
                write!(f, "MVCC read conflict on key {}", key)
            }
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            Self::Deserialize(msg) => write!(f, "Deserialization error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}
