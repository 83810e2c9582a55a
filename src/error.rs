use contract::ContractError;
use ledger::LedgerError;
use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    /// Connection profile missing, unreadable or inconsistent.
    Config(String),
    Wallet(String),
    /// No usable identity for the requested label.
    Identity(String),
    UnknownChannel(String),
    UnknownChaincode { channel: String, name: String },
    Io(std::io::Error),
    Contract(ContractError),
    Ledger(LedgerError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Wallet(msg) => write!(f, "Wallet error: {}", msg),
            Self::Identity(msg) => write!(f, "Identity error: {}", msg),
            Self::UnknownChannel(name) => write!(f, "Unknown channel: {}", name),
            Self::UnknownChaincode { channel, name } => {
                write!(f, "Chaincode {} is not deployed on channel {}", name, channel)
            }
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Contract(err) => write!(f, "{}", err),
            Self::Ledger(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Contract(err) => Some(err),
            Self::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ContractError> for ClientError {
    fn from(err: ContractError) -> Self {
        Self::Contract(err)
    }
}

impl From<LedgerError> for ClientError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}
