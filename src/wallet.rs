use crate::ClientError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const X509: &str = "X.509";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub certificate: String,
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

/// Enrolment certificate and key of one member of an organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509Identity {
    pub credentials: Credentials,
    #[serde(rename = "mspId")]
    pub msp_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
}

impl X509Identity {
    pub fn new(msp_id: &str, certificate: &str, private_key: &str) -> Self {
        Self {
            credentials: Credentials {
                certificate: certificate.to_string(),
                private_key: private_key.to_string(),
            },
            msp_id: msp_id.to_string(),
            kind: X509.to_string(),
            version: 1,
        }
    }
}

/// Directory of identities, one `<label>.id` JSON file each.
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    root: PathBuf,
}

impl FileSystemWallet {
    /// Open the wallet at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            ClientError::Wallet(format!("cannot create {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, label: &str) -> PathBuf {
        self.root.join(format!("{}.id", label))
    }

    pub fn exists(&self, label: &str) -> bool {
        self.file_for(label).is_file()
    }

    pub fn get(&self, label: &str) -> Result<X509Identity, ClientError> {
        let path = self.file_for(label);
        let raw = std::fs::read(&path).map_err(|e| {
            ClientError::Identity(format!("cannot read {}: {}", path.display(), e))
        })?;
        let identity: X509Identity = serde_json::from_slice(&raw).map_err(|e| {
            ClientError::Identity(format!("{} is not a valid identity: {}", path.display(), e))
        })?;

        if identity.kind != X509 {
            return Err(ClientError::Identity(format!(
                "unsupported identity type {} for {}",
                identity.kind, label
            )));
        }
        Ok(identity)
    }

    pub fn put(&self, label: &str, identity: &X509Identity) -> Result<(), ClientError> {
        let path = self.file_for(label);
        let raw = serde_json::to_vec(identity).map_err(|e| ClientError::Wallet(e.to_string()))?;
        std::fs::write(&path, raw).map_err(|e| {
            ClientError::Wallet(format!("cannot write {}: {}", path.display(), e))
        })
    }

    /// Labels of all stored identities, sorted.
    pub fn list(&self) -> Result<Vec<String>, ClientError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            ClientError::Wallet(format!("cannot list {}: {}", self.root.display(), e))
        })?;

        let mut labels = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "id") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    labels.push(stem.to_string());
                }
            }
        }
        labels.sort();
        Ok(labels)
    }

    /// Build an identity from an MSP directory and store it under `label`.
    ///
    /// The certificate is `<msp>/signcerts/cert.pem`; the key is the only file
    /// in `<msp>/keystore/`.
    pub fn populate_from_msp(
        &self,
        label: &str,
        msp_dir: &Path,
        msp_id: &str,
    ) -> Result<X509Identity, ClientError> {
        info!(label, msp = %msp_dir.display(), "populating wallet");

        let cert_path = msp_dir.join("signcerts").join("cert.pem");
        let certificate = std::fs::read_to_string(&cert_path).map_err(|e| {
            ClientError::Identity(format!("cannot read {}: {}", cert_path.display(), e))
        })?;

        let key_dir = msp_dir.join("keystore");
        let mut keys = std::fs::read_dir(&key_dir)
            .map_err(|e| {
                ClientError::Identity(format!("cannot read {}: {}", key_dir.display(), e))
            })?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;

        if keys.len() != 1 {
            return Err(ClientError::Identity(format!(
                "keystore {} should contain exactly one file, found {}",
                key_dir.display(),
                keys.len()
            )));
        }
        let key_path = keys.remove(0);
        let private_key = std::fs::read_to_string(&key_path).map_err(|e| {
            ClientError::Identity(format!("cannot read {}: {}", key_path.display(), e))
        })?;

        let identity = X509Identity::new(msp_id, &certificate, &private_key);
        self.put(label, &identity)?;
        Ok(identity)
    }
}
