// ledger/src/transaction.rs
use crate::record::{KeyModification, KeyValue, Version};
use crate::{LedgerError, StateAdapter};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Identity and timing of a single transaction proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHeader {
    pub tx_id: String,
    pub creator: String,
    pub timestamp: DateTime<Utc>,
}

impl TxHeader {
    pub fn new(creator: &str) -> Self {
        let nonce = Uuid::now_v7();
        Self {
            tx_id: derive_tx_id(nonce.as_bytes(), creator),
            creator: creator.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Transaction ids are the hex digest of nonce || creator.
pub(crate) fn derive_tx_id(nonce: &[u8], creator: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(nonce);
    hasher.update(creator.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Keys read by a transaction with the version observed at read time.
/// `None` records that the key was absent.
pub type ReadSet = BTreeMap<String, Option<Version>>;

/// Pending writes. `None` is a delete.
pub type WriteSet = BTreeMap<String, Option<Vec<u8>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RwSet {
    pub reads: ReadSet,
    pub writes: WriteSet,
}

impl RwSet {
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Handle given to contract code for the lifetime of one transaction.
///
/// Reads go to committed state and are recorded with their version; writes
/// are buffered and only reach the store when the owning [`crate::Ledger`]
/// commits. A transaction therefore does not observe its own pending writes.
#[derive(Clone)]
pub struct TransactionContext {
    adapter: Arc<dyn StateAdapter>,
    header: Arc<TxHeader>,
    rwset: Arc<Mutex<RwSet>>,
}

impl TransactionContext {
    pub fn new(adapter: Arc<dyn StateAdapter>, header: TxHeader) -> Self {
        Self {
            adapter,
            header: Arc::new(header),
            rwset: Arc::new(Mutex::new(RwSet::default())),
        }
    }

    pub fn header(&self) -> &TxHeader {
        &self.header
    }

    pub fn tx_id(&self) -> &str {
        &self.header.tx_id
    }

    pub fn creator(&self) -> &str {
        &self.header.creator
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp
    }

    pub async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        validate_key(key)?;
        let current = self.adapter.get_state(key).await?;
        self.rwset()
            .reads
            .entry(key.to_string())
            .or_insert(current.as_ref().map(|v| v.version));
        Ok(current.map(|v| v.value))
    }

    pub fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        validate_key(key)?;
        self.rwset().writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    pub fn del_state(&self, key: &str) -> Result<(), LedgerError> {
        validate_key(key)?;
        self.rwset().writes.insert(key.to_string(), None);
        Ok(())
    }

    pub async fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<KeyValue>, LedgerError> {
        let rows = self.adapter.get_state_by_range(start, end).await?;

        let mut rwset = self.rwset();
        let mut out = Vec::with_capacity(rows.len());
        for (key, versioned) in rows {
            rwset
                .reads
                .entry(key.clone())
                .or_insert(Some(versioned.version));
            out.push(KeyValue {
                key,
                value: versioned.value,
            });
        }
        Ok(out)
    }

    /// History is not part of the read set: it never changes what a commit
    /// would validate.
    pub async fn get_history_for_key(
        &self,
        key: &str,
    ) -> Result<Vec<KeyModification>, LedgerError> {
        validate_key(key)?;
        self.adapter.get_history_for_key(key).await
    }

    pub fn snapshot(&self) -> RwSet {
        self.rwset().clone()
    }

    fn rwset(&self) -> MutexGuard<'_, RwSet> {
        self.rwset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn validate_key(key: &str) -> Result<(), LedgerError> {
    if key.is_empty() {
        return Err(LedgerError::InvalidKey(key.to_string()));
    }
    if key.contains('\u{0}') {
        return Err(LedgerError::InvalidKey(key.to_string()));
    }
    Ok(())
}
