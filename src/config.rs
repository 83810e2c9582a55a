use crate::ClientError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CHANNEL: &str = "mychannel";
pub const DEFAULT_CHAINCODE: &str = "basic";
pub const DEFAULT_MSP_ID: &str = "Org1MSP";

/// Where the client's world state lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StateConfig {
    /// Process-local; gone when the client exits.
    #[default]
    Memory,
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub mspid: String,
    #[serde(default)]
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub chaincodes: Vec<String>,
}

/// Connection profile: the organisations the client may act for, the
/// channels it can reach and which chaincodes run on each.
///
/// ```json
/// {
///   "name": "test-network-org1",
///   "organizations": { "Org1": { "mspid": "Org1MSP", "peers": ["peer0.org1.example.com"] } },
///   "channels": { "mychannel": { "chaincodes": ["basic"] } },
///   "state": { "backend": "sqlite", "path": "state/ledger.db" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub organizations: BTreeMap<String, Organization>,
    pub channels: BTreeMap<String, Channel>,
    #[serde(default)]
    pub state: StateConfig,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl ConnectionProfile {
    /// Single organisation, `mychannel` running `basic`, in-memory state.
    pub fn local() -> Self {
        let organizations = BTreeMap::from([(
            "Org1".to_string(),
            Organization {
                mspid: DEFAULT_MSP_ID.to_string(),
                peers: vec!["peer0.org1.example.com".to_string()],
            },
        )]);
        let channels = BTreeMap::from([(
            DEFAULT_CHANNEL.to_string(),
            Channel {
                chaincodes: vec![DEFAULT_CHAINCODE.to_string()],
            },
        )]);

        Self {
            name: "local".to_string(),
            version: default_version(),
            organizations,
            channels,
            state: StateConfig::Memory,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ClientError> {
        let profile: Self =
            serde_json::from_str(raw).map_err(|e| ClientError::Config(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile file. A relative SQLite path is taken relative to the
    /// profile's own directory.
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut profile = Self::from_json(&raw)?;

        if let StateConfig::Sqlite { path: db } = &mut profile.state {
            if db.is_relative() {
                if let Some(dir) = path.parent() {
                    *db = dir.join(&*db);
                }
            }
        }

        Ok(profile)
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.organizations.is_empty() {
            return Err(ClientError::Config(
                "profile declares no organizations".to_string(),
            ));
        }
        if let Some((name, _)) = self
            .organizations
            .iter()
            .find(|(_, org)| org.mspid.trim().is_empty())
        {
            return Err(ClientError::Config(format!(
                "organization {} has no mspid",
                name
            )));
        }
        if let StateConfig::Sqlite { path } = &self.state {
            if path.as_os_str().is_empty() {
                return Err(ClientError::Config("sqlite backend needs a path".to_string()));
            }
        }
        Ok(())
    }

    pub fn organization_for_msp(&self, mspid: &str) -> Option<&Organization> {
        self.organizations.values().find(|org| org.mspid == mspid)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }
}
