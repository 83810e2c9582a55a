//! # Aportes
//!
//! Console client for the contribution ledger. It loads an identity from a
//! file-system wallet (creating it from MSP enrolment material when absent),
//! connects a [`gateway::Gateway`] to the world state described by a
//! connection profile and drives the asset contract from a numbered menu.
//!
//! ```text
//! aportes --profile connection-org1.json \
//!         --msp-path users/User1@org1.example.com/msp
//! ```
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod menu;
pub mod wallet;

pub use cli::Cli;
pub use config::{ConnectionProfile, StateConfig};
pub use error::ClientError;
pub use gateway::{Contract, Gateway, Invoker, Network};
pub use menu::{Menu, MenuOption};
pub use wallet::{FileSystemWallet, X509Identity};

use tracing::info;

/// Load the identity, connect and hand over to the menu on stdin/stdout.
pub async fn run(cli: Cli) -> Result<(), ClientError> {
    let contract = connect(&cli).await?;

    let stdin = std::io::stdin();
    let mut menu = Menu::new(stdin.lock(), std::io::stdout(), contract);
    menu.run().await
}

/// Everything before the menu: wallet, profile, gateway and the optional
/// `InitLedger` submission. Any failure here is fatal for the client.
pub async fn connect(cli: &Cli) -> Result<Contract, ClientError> {
    let wallet = FileSystemWallet::open(&cli.wallet)?;
    if !wallet.exists(&cli.identity) {
        let msp_path = cli.msp_path.as_deref().ok_or_else(|| {
            ClientError::Identity(format!(
                "{} is not in wallet {} and no MSP path was given",
                cli.identity,
                wallet.root().display()
            ))
        })?;
        wallet.populate_from_msp(&cli.identity, msp_path, &cli.msp_id)?;
    }
    let identity = wallet.get(&cli.identity)?;

    let profile = match &cli.profile {
        Some(path) => ConnectionProfile::from_file(path)?,
        None => ConnectionProfile::local(),
    };

    let gateway = Gateway::connect(profile, identity).await?;
    let contract = gateway.network(&cli.channel)?.contract(&cli.chaincode)?;

    if !cli.skip_init {
        info!("submitting InitLedger");
        contract.submit("InitLedger", &[]).await?;
    }

    Ok(contract)
}
