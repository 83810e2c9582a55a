// ledger/src/adapters/memory.rs
use crate::record::in_range;
use crate::{
    KeyModification, LedgerError, RwSet, StateAdapter, TxHeader, Version, VersionedValue,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MemoryStore {
    state: BTreeMap<String, VersionedValue>,
    history: HashMap<String, Vec<KeyModification>>,
    height: Version,
}

impl MemoryStore {
    fn validate_reads(&self, rwset: &RwSet) -> Result<(), LedgerError> {
        for (key, read_version) in &rwset.reads {
            let current = self.state.get(key).map(|v| v.version);
            if current != *read_version {
                return Err(LedgerError::MvccConflict(key.clone()));
            }
        }
        Ok(())
    }
}

/// Process-local world state. Clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    store: Arc<Mutex<MemoryStore>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, MemoryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StateAdapter for MemoryAdapter {
    async fn get_state(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        Ok(self.store().state.get(key).cloned())
    }

    async fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, VersionedValue)>, LedgerError> {
        let store = self.store();
        Ok(store
            .state
            .range(start.to_string()..)
            .take_while(|(key, _)| in_range(key, start, end))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn get_history_for_key(
        &self,
        key: &str,
    ) -> Result<Vec<KeyModification>, LedgerError> {
        Ok(self.store().history.get(key).cloned().unwrap_or_default())
    }

    async fn commit(&self, header: &TxHeader, rwset: &RwSet) -> Result<Version, LedgerError> {
        // Validation and apply happen under one lock, so a commit is all or nothing.
        let mut store = self.store();
        store.validate_reads(rwset)?;

        store.height += 1;
        let height = store.height;

        for (key, write) in &rwset.writes {
            let modification = match write {
                Some(value) => {
                    store.state.insert(
                        key.clone(),
                        VersionedValue {
                            value: value.clone(),
                            version: height,
                        },
                    );
                    KeyModification::write(&header.tx_id, value.clone(), header.timestamp)
                }
                None => {
                    store.state.remove(key);
                    KeyModification::delete(&header.tx_id, header.timestamp)
                }
            };
            store
                .history
                .entry(key.clone())
                .or_default()
                .push(modification);
        }

        Ok(height)
    }

    async fn height(&self) -> Result<Version, LedgerError> {
        Ok(self.store().height)
    }
}
