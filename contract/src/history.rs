use crate::{Asset, ContractError};
use chrono::{DateTime, Utc};
use ledger::KeyModification;
use serde::{Deserialize, Serialize};

/// One version of an asset as returned by `GetAssetHistory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQueryResult {
    pub record: HistoryRecord,
    #[serde(rename = "txId")]
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isDelete")]
    pub is_delete: bool,
}

/// The `record` of a history entry. A deletion only names the key it removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryRecord {
    Asset(Asset),
    Deleted {
        #[serde(rename = "RUC")]
        ruc: String,
    },
}

impl HistoryRecord {
    pub fn asset(&self) -> Option<&Asset> {
        match self {
            HistoryRecord::Asset(asset) => Some(asset),
            HistoryRecord::Deleted { .. } => None,
        }
    }

    pub fn ruc(&self) -> &str {
        match self {
            HistoryRecord::Asset(asset) => &asset.ruc,
            HistoryRecord::Deleted { ruc } => ruc,
        }
    }
}

impl HistoryQueryResult {
    /// Decode one modification of `ruc`.
    pub fn from_modification(
        ruc: &str,
        modification: KeyModification,
    ) -> Result<Self, ContractError> {
        let record = if modification.is_delete || modification.value.is_empty() {
            HistoryRecord::Deleted {
                ruc: ruc.to_string(),
            }
        } else {
            HistoryRecord::Asset(Asset::from_json(&modification.value)?)
        };

        Ok(Self {
            record,
            tx_id: modification.tx_id,
            timestamp: modification.timestamp,
            is_delete: modification.is_delete,
        })
    }
}
