use crate::config::{DEFAULT_CHAINCODE, DEFAULT_CHANNEL, DEFAULT_MSP_ID};
use clap::Parser;
use std::path::PathBuf;

/// Console client for the contribution ledger
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "aportes")]
pub struct Cli {
    /// Connection profile (JSON). Without one, a local in-memory network is used
    #[arg(short, long, env = "APORTES_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Wallet directory
    #[arg(short, long, default_value = "wallet", env = "APORTES_WALLET")]
    pub wallet: PathBuf,

    /// Wallet label of the identity to act as
    #[arg(short, long, default_value = "appUser", env = "APORTES_IDENTITY")]
    pub identity: String,

    /// MSP directory used to create the identity when the wallet lacks it
    #[arg(long, env = "APORTES_MSP_PATH")]
    pub msp_path: Option<PathBuf>,

    /// MSP id recorded on an identity created from --msp-path
    #[arg(long, default_value = DEFAULT_MSP_ID, env = "APORTES_MSP_ID")]
    pub msp_id: String,

    #[arg(long, default_value = DEFAULT_CHANNEL, env = "APORTES_CHANNEL")]
    pub channel: String,

    #[arg(long, default_value = DEFAULT_CHAINCODE, env = "APORTES_CHAINCODE")]
    pub chaincode: String,

    /// Do not submit InitLedger at start-up
    #[arg(long)]
    pub skip_init: bool,
}
