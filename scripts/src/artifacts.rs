//! Loading of compiled contract artifacts.
//!
//! Both the Hardhat layout (`bytecode` is a hex string) and the Foundry layout
//! (`bytecode.object` is a hex string) are accepted. Both toolchains place the
//! artifact for contract `Name` at `<dir>/<Name>.sol/<Name>.json`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    constants::{ARTIFACT_EXTENSION, SOLIDITY_EXTENSION},
    errors::ScriptError,
    types::MarketplaceContract,
};

/// The creation bytecode field of an artifact
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    /// Hardhat: the bytecode is a bare hex string
    Hex(Bytes),
    /// Foundry: the bytecode is nested under `object`
    Object {
        /// The hex-encoded creation bytecode
        object: Bytes,
    },
}

/// The subset of a compilation artifact the scripts need
#[derive(Deserialize)]
struct RawArtifact {
    /// The contract ABI
    abi: Vec<Value>,
    /// The creation bytecode
    bytecode: ArtifactBytecode,
}

/// A compiled contract, ready to be deployed
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// The contract's creation bytecode
    pub bytecode: Bytes,
    /// The number of inputs the contract's constructor takes
    pub constructor_inputs: usize,
}

impl ContractArtifact {
    /// Parse an artifact from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let raw: RawArtifact =
            serde_json::from_str(json).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        let bytecode = match raw.bytecode {
            ArtifactBytecode::Hex(b) | ArtifactBytecode::Object { object: b } => b,
        };
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(
                "artifact has empty creation bytecode, is the contract abstract?".to_string(),
            ));
        }

        // Contracts without an explicit constructor have no constructor entry in the ABI
        let constructor_inputs = raw
            .abi
            .iter()
            .find(|item| item["type"] == "constructor")
            .and_then(|item| item["inputs"].as_array())
            .map_or(0, |inputs| inputs.len());

        Ok(Self {
            bytecode,
            constructor_inputs,
        })
    }

    /// The creation code for a deployment with the given ABI-encoded constructor arguments
    pub fn creation_code(&self, encoded_args: &[u8]) -> Bytes {
        [self.bytecode.as_ref(), encoded_args].concat().into()
    }
}

/// The path of the given contract's artifact within the artifacts directory
pub fn artifact_path(artifacts_dir: &Path, contract: MarketplaceContract) -> PathBuf {
    artifacts_dir
        .join(format!("{}.{}", contract.name(), SOLIDITY_EXTENSION))
        .join(format!("{}.{}", contract.name(), ARTIFACT_EXTENSION))
}

/// Read and parse the given contract's artifact from the artifacts directory
pub fn load_artifact(
    artifacts_dir: &Path,
    contract: MarketplaceContract,
) -> Result<ContractArtifact, ScriptError> {
    let path = artifact_path(artifacts_dir, contract);
    let json = fs::read_to_string(&path).map_err(|e| {
        ScriptError::ArtifactParsing(format!("could not read {}: {}", path.display(), e))
    })?;

    ContractArtifact::from_json(&json)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::types::MarketplaceContract;

    use super::{artifact_path, ContractArtifact};

    const HARDHAT_ARTIFACT: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "Appeals",
        "abi": [
            {
                "type": "constructor",
                "inputs": [
                    { "name": "_settings", "type": "address" },
                    { "name": "_vault", "type": "address" }
                ]
            },
            { "type": "function", "name": "setDealsAddress", "inputs": [] }
        ],
        "bytecode": "0x6080604052",
        "deployedBytecode": "0x6080"
    }"#;

    const FOUNDRY_ARTIFACT: &str = r#"{
        "abi": [],
        "bytecode": { "object": "0x60806040", "linkReferences": {} }
    }"#;

    #[test]
    fn test_parse_hardhat_artifact() {
        let artifact = ContractArtifact::from_json(HARDHAT_ARTIFACT).unwrap();
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(artifact.constructor_inputs, 2);
    }

    #[test]
    fn test_parse_foundry_artifact() {
        let artifact = ContractArtifact::from_json(FOUNDRY_ARTIFACT).unwrap();
        assert_eq!(artifact.bytecode.len(), 4);
        assert_eq!(artifact.constructor_inputs, 0);
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let json = r#"{ "abi": [], "bytecode": "0x" }"#;
        assert!(ContractArtifact::from_json(json).is_err());
    }

    #[test]
    fn test_creation_code_appends_args() {
        let artifact = ContractArtifact::from_json(FOUNDRY_ARTIFACT).unwrap();
        let code = artifact.creation_code(&[0xaa, 0xbb]);
        assert_eq!(code.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0xaa, 0xbb]);
    }

    #[test]
    fn test_artifact_path_layout() {
        let path = artifact_path(Path::new("artifacts/contracts"), MarketplaceContract::Vault);
        assert_eq!(path, Path::new("artifacts/contracts/Vault.sol/Vault.json"));
    }
}
