//! The `deployments.json` file, recording the address and constructor
//! arguments of every contract deployed by the scripts

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    constants::ARTIFACT_EXTENSION,
    errors::ScriptError,
    types::{DeploymentRecord, MarketplaceContract, WiringCall},
};

/// The on-disk layout of the deployments file
#[derive(Debug, Default, Serialize, Deserialize)]
struct DeploymentsFile {
    /// The chain the deployments were made on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chain_id: Option<u64>,
    /// The deployment records, keyed by contract deployment key
    #[serde(default)]
    deployments: BTreeMap<String, DeploymentRecord>,
}

/// A handle on the deployments file
#[derive(Debug)]
pub struct DeploymentStore {
    /// The path of the deployments file
    path: PathBuf,
    /// The current contents of the file
    contents: DeploymentsFile,
}

impl DeploymentStore {
    /// Load the deployments file at the given path.
    ///
    /// A missing file is treated as an empty store, it is created on the first write.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref().to_path_buf();
        let contents = if path.exists() {
            let json = fs::read_to_string(&path)
                .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
            serde_json::from_str(&json).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?
        } else {
            debug!("no deployments file at {}, starting empty", path.display());
            DeploymentsFile::default()
        };

        Ok(Self { path, contents })
    }

    /// The path of the deployments file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The chain the recorded deployments were made on, if known
    pub fn chain_id(&self) -> Option<u64> {
        self.contents.chain_id
    }

    /// Whether the store holds no deployment records
    pub fn is_empty(&self) -> bool {
        self.contents.deployments.is_empty()
    }

    /// Bind the store to the given chain.
    ///
    /// Errors if the store already holds deployments from a different chain.
    pub fn bind_chain(&mut self, chain_id: u64) -> Result<(), ScriptError> {
        match self.contents.chain_id {
            Some(recorded) if recorded != chain_id => Err(ScriptError::ChainMismatch {
                recorded,
                connected: chain_id,
            }),
            _ => {
                self.contents.chain_id = Some(chain_id);
                Ok(())
            }
        }
    }

    /// Bind the store to the given chain, moving to a chain-specific file
    /// alongside this one if it holds deployments from a different chain.
    ///
    /// The records of the other chain are left untouched on disk.
    pub fn rebind_chain(mut self, chain_id: u64) -> Result<Self, ScriptError> {
        match self.contents.chain_id {
            Some(recorded) if recorded != chain_id => {
                let path = chain_specific_path(&self.path, chain_id);
                warn!(
                    "{} holds deployments from chain {}, recording chain {} deployments in {}",
                    self.path.display(),
                    recorded,
                    chain_id,
                    path.display()
                );

                let mut store = Self::load(path)?;
                store.bind_chain(chain_id)?;
                Ok(store)
            }
            _ => {
                self.bind_chain(chain_id)?;
                Ok(self)
            }
        }
    }

    /// Get the deployment record of the given contract
    pub fn get(&self, contract: MarketplaceContract) -> Option<&DeploymentRecord> {
        self.contents.deployments.get(contract.deployment_key())
    }

    /// Get the deployment record of the given contract, erroring if it is absent
    pub fn require(&self, contract: MarketplaceContract) -> Result<&DeploymentRecord, ScriptError> {
        self.get(contract).ok_or_else(|| {
            ScriptError::ReadDeployments(format!(
                "no {} deployment in {}",
                contract,
                self.path.display()
            ))
        })
    }

    /// The address of the recorded deployment of `contract`, if it was made
    /// with exactly the given constructor arguments
    pub fn reusable(&self, contract: MarketplaceContract, args: &[Address]) -> Option<Address> {
        let record = self.get(contract)?;
        if record.args == args {
            Some(record.address)
        } else {
            debug!("constructor arguments of recorded {contract} deployment differ, redeploying");
            None
        }
    }

    /// The records of every contract taking part in the wiring calls.
    ///
    /// Errors if the store is empty or any of those contracts is missing.
    pub fn wiring_records(
        &self,
    ) -> Result<Vec<(MarketplaceContract, DeploymentRecord)>, ScriptError> {
        if self.is_empty() {
            return Err(ScriptError::ReadDeployments(format!(
                "{} holds no deployments",
                self.path.display()
            )));
        }

        MarketplaceContract::ALL
            .into_iter()
            .filter(|contract| {
                WiringCall::ALL
                    .iter()
                    .any(|call| call.target() == *contract || call.argument() == *contract)
            })
            .map(|contract| self.require(contract).map(|record| (contract, record.clone())))
            .collect()
    }

    /// Record a deployment and persist the file
    pub fn record(
        &mut self,
        contract: MarketplaceContract,
        record: DeploymentRecord,
    ) -> Result<(), ScriptError> {
        self.contents
            .deployments
            .insert(contract.deployment_key().to_string(), record);
        self.save()
    }

    /// Write the store to disk
    pub fn save(&self) -> Result<(), ScriptError> {
        let json = serde_json::to_string_pretty(&self.contents)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }
}

/// The path of the deployments file for `chain_id` next to `path`,
/// e.g. `deployments.314159.json` next to `deployments.json`
fn chain_specific_path(path: &Path, chain_id: u64) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!("{stem}.{chain_id}.{ARTIFACT_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf};

    use alloy::primitives::Address;

    use crate::{
        errors::ScriptError,
        types::{DeploymentRecord, MarketplaceContract},
    };

    use super::DeploymentStore;

    /// A deployments file path unique to the calling test
    fn temp_path(name: &str) -> PathBuf {
        let path = env::temp_dir().join(format!(
            "marketplace-scripts-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = DeploymentStore::load(temp_path("missing")).unwrap();
        assert!(store.get(MarketplaceContract::Settings).is_none());
        assert!(store.chain_id().is_none());
        assert!(store.require(MarketplaceContract::Deals).is_err());
    }

    #[test]
    fn test_record_persists() {
        let path = temp_path("persist");
        let settings = Address::repeat_byte(0xaa);
        let vault = DeploymentRecord {
            address: Address::repeat_byte(0xbb),
            args: vec![settings],
        };

        let mut store = DeploymentStore::load(&path).unwrap();
        store.bind_chain(31337).unwrap();
        store.record(MarketplaceContract::Vault, vault.clone()).unwrap();

        let reloaded = DeploymentStore::load(&path).unwrap();
        assert_eq!(reloaded.chain_id(), Some(31337));
        assert_eq!(reloaded.get(MarketplaceContract::Vault), Some(&vault));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("vault_contract"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_chain_mismatch() {
        let path = temp_path("chain");
        let mut store = DeploymentStore::load(&path).unwrap();
        store.bind_chain(1).unwrap();
        store.bind_chain(1).unwrap();

        let err = store.bind_chain(314159).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::ChainMismatch {
                recorded: 1,
                connected: 314159
            }
        ));
    }

    #[test]
    fn test_rebind_to_other_chain_starts_fresh() {
        let path = temp_path("rebind");
        let other = path.with_file_name(format!(
            "marketplace-scripts-rebind-{}.314159.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&other);

        let mut store = DeploymentStore::load(&path).unwrap();
        store.bind_chain(1).unwrap();
        store.record(MarketplaceContract::Settings, record(0xaa, vec![])).unwrap();

        let store = DeploymentStore::load(&path).unwrap().rebind_chain(314159).unwrap();
        assert_eq!(store.path(), other.as_path());
        assert_eq!(store.chain_id(), Some(314159));
        assert!(store.is_empty());

        // The other chain's records are kept
        let original = DeploymentStore::load(&path).unwrap();
        assert_eq!(original.chain_id(), Some(1));
        assert!(original.get(MarketplaceContract::Settings).is_some());

        // Rebinding to the recorded chain keeps the store as is
        let same = DeploymentStore::load(&path).unwrap().rebind_chain(1).unwrap();
        assert_eq!(same.path(), path.as_path());
        assert!(!same.is_empty());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reusable_requires_identical_args() {
        let path = temp_path("reusable");
        let settings = Address::repeat_byte(0xaa);
        let mut store = DeploymentStore::load(&path).unwrap();
        store.bind_chain(31337).unwrap();
        store.record(MarketplaceContract::Vault, record(0xbb, vec![settings])).unwrap();

        assert_eq!(
            store.reusable(MarketplaceContract::Vault, &[settings]),
            Some(Address::repeat_byte(0xbb))
        );
        assert_eq!(
            store.reusable(MarketplaceContract::Vault, &[Address::repeat_byte(0xcc)]),
            None
        );
        assert_eq!(store.reusable(MarketplaceContract::Vault, &[]), None);
        assert_eq!(store.reusable(MarketplaceContract::Appeals, &[settings]), None);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_wiring_records() {
        let path = temp_path("wiring");
        let mut store = DeploymentStore::load(&path).unwrap();
        assert!(matches!(
            store.wiring_records(),
            Err(ScriptError::ReadDeployments(msg)) if msg.contains("holds no deployments")
        ));

        store.bind_chain(31337).unwrap();
        store.record(MarketplaceContract::Vault, record(0xbb, vec![])).unwrap();
        store.record(MarketplaceContract::Appeals, record(0xcc, vec![])).unwrap();
        store.record(MarketplaceContract::Providers, record(0xdd, vec![])).unwrap();
        assert!(matches!(
            store.wiring_records(),
            Err(ScriptError::ReadDeployments(msg)) if msg.contains("no Deals deployment")
        ));

        store.record(MarketplaceContract::Deals, record(0xee, vec![])).unwrap();
        let contracts: Vec<_> = store
            .wiring_records()
            .unwrap()
            .into_iter()
            .map(|(contract, _)| contract)
            .collect();
        assert_eq!(
            contracts,
            vec![
                MarketplaceContract::Vault,
                MarketplaceContract::Appeals,
                MarketplaceContract::Providers,
                MarketplaceContract::Deals,
            ]
        );

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_deployments_without_chain_id() {
        let path = temp_path("no-chain");
        let vault = format!("{:#x}", Address::repeat_byte(0xbb));
        fs::write(
            &path,
            format!(r#"{{"deployments": {{"vault_contract": {{"address": "{vault}", "args": []}}}}}}"#),
        )
        .unwrap();

        let mut store = DeploymentStore::load(&path).unwrap();
        assert!(store.chain_id().is_none());
        assert!(!store.is_empty());

        store.bind_chain(31337).unwrap();
        assert_eq!(store.chain_id(), Some(31337));
        assert_eq!(
            store.get(MarketplaceContract::Vault).map(|r| r.address),
            Some(Address::repeat_byte(0xbb))
        );

        fs::remove_file(path).unwrap();
    }

    /// A deployment record at an address made of the given byte
    fn record(byte: u8, args: Vec<Address>) -> DeploymentRecord {
        DeploymentRecord {
            address: Address::repeat_byte(byte),
            args,
        }
    }
}
