use crate::Amount;
use ledger::LedgerError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    AssetExists(String),
    AssetNotFound(String),
    /// Contributions would pass the asset's ceiling.
    ContributionLimitExceeded {
        ruc: String,
        total: Amount,
        limit: Amount,
    },
    /// Expenses would pass what has been contributed.
    ExpensesExceedContributions {
        ruc: String,
        total: Amount,
        contributions: Amount,
    },
    InvalidAmount(String),
    InvalidArgument {
        param: String,
        reason: String,
    },
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },
    UnknownFunction(String),
    Serialize(String),
    Deserialize(String),
    Ledger(LedgerError),
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetExists(ruc) => write!(f, "the asset {} already exists", ruc),
            Self::AssetNotFound(ruc) => write!(f, "the asset {} does not exist", ruc),
            Self::ContributionLimitExceeded { ruc, total, limit } => write!(
                f,
                "total contributions for {} would be {}, above the maximum of {}",
                ruc, total, limit
            ),
            Self::ExpensesExceedContributions {
                ruc,
                total,
                contributions,
            } => write!(
                f,
                "total expenses for {} would be {}, above total contributions of {}",
                ruc, total, contributions
            ),
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            Self::InvalidArgument { param, reason } => {
                write!(f, "Invalid argument {}: {}", param, reason)
            }
            Self::ArgumentCount {
                function,
                expected,
                got,
            } => write!(
                f,
                "{} expects {} argument(s), got {}",
                function, expected, got
            ),
            Self::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            Self::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            Self::Deserialize(msg) => write!(f, "Deserialization error: {}", msg),
            Self::Ledger(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ContractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LedgerError> for ContractError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}
