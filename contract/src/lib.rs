//! # Aportes contract
//!
//! Business rules for a ledger of political-finance records. Every record is
//! an [`Asset`] keyed by its RUC (tax id) and tagged with a [`DocType`]:
//! political organisations, contributors, suppliers, and the receipts of
//! individual contributions and payments.
//!
//! Two rules are enforced on every transfer:
//!
//! * an organisation never receives more than its `montoMax`;
//! * an organisation never spends more than it has received.
//!
//! Operations run inside a [`ledger::TransactionContext`], so a failed rule
//! leaves world state untouched.
//!
//! ```rust,ignore
//! let ledger = Ledger::new(Box::new(MemoryAdapter::new()));
//! let contract = AssetContract::new();
//!
//! ledger
//!     .submit("Org1MSP", |ctx| async move {
//!         contract.transfer_contribution(&ctx, "11223344556", Amount::from_units(100)).await
//!     })
//!     .await?;
//! ```
//!
//! Clients that only know function names and string arguments go through
//! the [`Chaincode`] trait instead.
pub mod amount;
pub mod asset;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod history;

pub use amount::{Amount, ParseAmountError};
pub use asset::{Asset, DocType, SEED_ASSETS};
pub use contract::AssetContract;
pub use dispatch::{Chaincode, Function};
pub use error::ContractError;
pub use history::{HistoryQueryResult, HistoryRecord};
