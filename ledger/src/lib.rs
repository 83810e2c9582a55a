// ledger/src/lib.rs
pub mod adapters;
pub mod error;
pub mod record;
pub mod transaction;

pub use error::LedgerError;
pub use record::{KeyModification, KeyValue, Version, VersionedValue};
pub use transaction::{ReadSet, RwSet, TransactionContext, TxHeader, WriteSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Storage backend for world state and the per-key history log
#[async_trait]
pub trait StateAdapter: Send + Sync {
    /// Current committed value of `key`, if any.
    async fn get_state(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError>;

    /// Committed keys in `[start, end)` in ascending key order. Empty bounds
    /// are open.
    async fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, VersionedValue)>, LedgerError>;

    /// Every committed modification of `key`, oldest first.
    async fn get_history_for_key(&self, key: &str)
    -> Result<Vec<KeyModification>, LedgerError>;

    /// Commit a transaction's read/write set.
    /// Implementors MUST:
    /// 1. Check every read version still matches committed state, returning
    ///    MvccConflict otherwise
    /// 2. Allocate the next height
    /// 3. Apply all writes and deletes at that height, appending history
    /// 4. Do all of the above atomically, leaving nothing behind on error
    async fn commit(&self, header: &TxHeader, rwset: &RwSet) -> Result<Version, LedgerError>;

    /// Height of the last commit, 0 for an empty ledger.
    async fn height(&self) -> Result<Version, LedgerError>;
}

/// Outcome of a committed transaction
#[derive(Debug, Clone)]
pub struct Receipt<T> {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    pub height: Version,
    pub result: T,
}

/// Entry point to the ledger: runs transaction closures against an adapter
#[derive(Clone)]
pub struct Ledger {
    adapter: Arc<dyn StateAdapter>,
}

impl Ledger {
    pub fn new(adapter: Box<dyn StateAdapter>) -> Self {
        Self {
            adapter: adapter.into(),
        }
    }

    pub fn from_arc(adapter: Arc<dyn StateAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &dyn StateAdapter {
        self.adapter.as_ref()
    }

    pub fn adapter_arc(&self) -> Arc<dyn StateAdapter> {
        Arc::clone(&self.adapter)
    }

    /// Start a transaction context without running or committing anything.
    pub fn begin(&self, creator: &str) -> TransactionContext {
        TransactionContext::new(self.adapter_arc(), TxHeader::new(creator))
    }

    /// Run `f` as a transaction and commit its writes.
    ///
    /// Nothing is written if `f` fails. A commit fails with
    /// [`LedgerError::MvccConflict`] if any key `f` read was changed by another
    /// commit in the meantime.
    pub async fn submit<F, Fut, T, E>(&self, creator: &str, f: F) -> Result<Receipt<T>, E>
    where
        F: FnOnce(TransactionContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LedgerError>,
    {
        let ctx = self.begin(creator);
        let result = f(ctx.clone()).await?;

        let rwset = ctx.snapshot();
        let header = ctx.header().clone();

        let start = Instant::now();
        let committed = self.adapter.commit(&header, &rwset).await;
        histogram!("ledger.commit.duration_ms").record(start.elapsed().as_millis() as f64);

        counter!("ledger.commits.total",
            "status" => if committed.is_ok() { "success" } else { "failed" }
        )
        .increment(1);

        match committed {
            Ok(height) => {
                debug!(
                    tx_id = %header.tx_id,
                    height,
                    reads = rwset.reads.len(),
                    writes = rwset.writes.len(),
                    "transaction committed"
                );
                Ok(Receipt {
                    tx_id: header.tx_id,
                    timestamp: header.timestamp,
                    height,
                    result,
                })
            }
            Err(err) => {
                warn!(tx_id = %header.tx_id, error = %err, "commit rejected");
                Err(err.into())
            }
        }
    }

    /// Run `f` against committed state without committing. Writes made by
    /// `f` are discarded.
    pub async fn evaluate<F, Fut, T, E>(&self, creator: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(TransactionContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        f(self.begin(creator)).await
    }
}
