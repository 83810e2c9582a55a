use crate::config::{ConnectionProfile, StateConfig};
use crate::wallet::X509Identity;
use crate::ClientError;
use async_trait::async_trait;
use contract::{AssetContract, Chaincode};
use ledger::Ledger;
use ledger::adapters::MemoryAdapter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Submit and evaluate named transactions.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Run and commit. Returns the transaction's result bytes.
    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ClientError>;

    /// Run against committed state; nothing is written.
    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ClientError>;
}

/// A connection to the world state on behalf of one identity.
///
/// Every channel in the profile shares the gateway's world state.
pub struct Gateway {
    profile: ConnectionProfile,
    identity: X509Identity,
    ledger: Ledger,
}

impl Gateway {
    /// Check the identity against the profile and open the state backend.
    pub async fn connect(
        profile: ConnectionProfile,
        identity: X509Identity,
    ) -> Result<Self, ClientError> {
        if profile.organization_for_msp(&identity.msp_id).is_none() {
            return Err(ClientError::Identity(format!(
                "{} is not an organization of profile {}",
                identity.msp_id, profile.name
            )));
        }

        let ledger = open_ledger(&profile.state).await?;
        info!(profile = %profile.name, msp = %identity.msp_id, "gateway connected");

        Ok(Self {
            profile,
            identity,
            ledger,
        })
    }

    pub fn identity(&self) -> &X509Identity {
        &self.identity
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn network(&self, channel: &str) -> Result<Network, ClientError> {
        let chaincodes = self
            .profile
            .channel(channel)
            .ok_or_else(|| ClientError::UnknownChannel(channel.to_string()))?
            .chaincodes
            .clone();

        Ok(Network {
            name: channel.to_string(),
            chaincodes,
            ledger: self.ledger.clone(),
            creator: self.identity.msp_id.clone(),
        })
    }
}

async fn open_ledger(state: &StateConfig) -> Result<Ledger, ClientError> {
    match state {
        StateConfig::Memory => Ok(Ledger::new(Box::new(MemoryAdapter::new()))),
        #[cfg(feature = "sqlite")]
        StateConfig::Sqlite { path } => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let path = path.to_str().ok_or_else(|| {
                ClientError::Config(format!("non UTF-8 database path {}", path.display()))
            })?;
            let adapter = ledger::adapters::SqliteAdapter::new_file(path).await?;
            adapter.init_schema().await?;
            Ok(Ledger::new(Box::new(adapter)))
        }
        #[cfg(not(feature = "sqlite"))]
        StateConfig::Sqlite { .. } => Err(ClientError::Config(
            "built without sqlite support".to_string(),
        )),
    }
}

pub struct Network {
    name: String,
    chaincodes: Vec<String>,
    ledger: Ledger,
    creator: String,
}

impl Network {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contract(&self, name: &str) -> Result<Contract, ClientError> {
        if !self.chaincodes.iter().any(|c| c == name) {
            return Err(ClientError::UnknownChaincode {
                channel: self.name.clone(),
                name: name.to_string(),
            });
        }

        Ok(Contract {
            name: name.to_string(),
            ledger: self.ledger.clone(),
            creator: self.creator.clone(),
            chaincode: Arc::new(AssetContract::new()),
        })
    }
}

/// Handle on one deployed chaincode.
#[derive(Clone)]
pub struct Contract {
    name: String,
    ledger: Ledger,
    creator: String,
    chaincode: Arc<dyn Chaincode>,
}

impl Contract {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Invoker for Contract {
    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ClientError> {
        let chaincode = self.chaincode.clone();
        let owned_function = function.to_string();
        let owned_args = args.to_vec();

        let receipt = self
            .ledger
            .submit(&self.creator, |ctx| async move {
                chaincode.invoke(&ctx, &owned_function, &owned_args).await
            })
            .await
            .inspect_err(|err| warn!(function, error = %err, "submit failed"))?;

        info!(
            function,
            tx_id = %receipt.tx_id,
            height = receipt.height,
            "transaction committed"
        );
        Ok(receipt.result)
    }

    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ClientError> {
        let chaincode = self.chaincode.clone();
        let owned_function = function.to_string();
        let owned_args = args.to_vec();

        debug!(function, "evaluate");
        let result = self
            .ledger
            .evaluate(&self.creator, |ctx| async move {
                chaincode.invoke(&ctx, &owned_function, &owned_args).await
            })
            .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CHAINCODE, DEFAULT_CHANNEL};
    use ledger::StateAdapter;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    async fn connect() -> Gateway {
        Gateway::connect(
            ConnectionProfile::local(),
            X509Identity::new("Org1MSP", "cert", "key"),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_then_evaluate() {
        let gateway = connect().await;
        let contract = gateway
            .network(DEFAULT_CHANNEL)
            .unwrap()
            .contract(DEFAULT_CHAINCODE)
            .unwrap();

        contract.submit("InitLedger", &[]).await.unwrap();
        let exists = contract
            .evaluate("AssetExists", &args(&["11223344556"]))
            .await
            .unwrap();
        assert_eq!(exists, b"true");
        assert_eq!(gateway.ledger().adapter().height().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_never_commits() {
        let gateway = connect().await;
        let contract = gateway
            .network(DEFAULT_CHANNEL)
            .unwrap()
            .contract(DEFAULT_CHAINCODE)
            .unwrap();

        contract.evaluate("InitLedger", &[]).await.unwrap();
        let exists = contract
            .evaluate("AssetExists", &args(&["11223344556"]))
            .await
            .unwrap();
        assert_eq!(exists, b"false");
    }

    #[tokio::test]
    async fn test_contract_errors_surface() {
        let gateway = connect().await;
        let contract = gateway
            .network(DEFAULT_CHANNEL)
            .unwrap()
            .contract(DEFAULT_CHAINCODE)
            .unwrap();

        let err = contract
            .submit("ReadAsset", &args(&["nope"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Contract(contract::ContractError::AssetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_channel_and_chaincode() {
        let gateway = connect().await;
        assert!(matches!(
            gateway.network("otherchannel"),
            Err(ClientError::UnknownChannel(_))
        ));
        assert!(matches!(
            gateway.network(DEFAULT_CHANNEL).unwrap().contract("fabcar"),
            Err(ClientError::UnknownChaincode { .. })
        ));
    }

    #[tokio::test]
    async fn test_identity_must_belong_to_profile() {
        let result = Gateway::connect(
            ConnectionProfile::local(),
            X509Identity::new("Org9MSP", "cert", "key"),
        )
        .await;
        assert!(matches!(result, Err(ClientError::Identity(_))));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_sqlite_state_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let mut profile = ConnectionProfile::local();
        profile.state = StateConfig::Sqlite {
            path: dir.path().join("state").join("ledger.db"),
        };
        let identity = X509Identity::new("Org1MSP", "cert", "key");

        {
            let gateway = Gateway::connect(profile.clone(), identity.clone())
                .await
                .unwrap();
            let contract = gateway
                .network(DEFAULT_CHANNEL)
                .unwrap()
                .contract(DEFAULT_CHAINCODE)
                .unwrap();
            contract.submit("InitLedger", &[]).await.unwrap();
        }

        let gateway = Gateway::connect(profile, identity).await.unwrap();
        let contract = gateway
            .network(DEFAULT_CHANNEL)
            .unwrap()
            .contract(DEFAULT_CHAINCODE)
            .unwrap();
        let exists = contract
            .evaluate("AssetExists", &args(&["66778899001"]))
            .await
            .unwrap();
        assert_eq!(exists, b"true");
    }
}
