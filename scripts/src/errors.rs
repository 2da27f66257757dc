//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::types::MarketplaceContract;

/// Errors that can occur during the execution of the deployment scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error fetching the network fee data
    FeeEstimation(String),
    /// Error parsing a Solidity compilation artifact
    ArtifactParsing(String),
    /// Error reading the `deployments.json` file
    ReadDeployments(String),
    /// Error writing the `deployments.json` file
    WriteDeployments(String),
    /// Error constructing calldata for a contract method or constructor
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A transaction was mined but reverted
    TransactionReverted(String),
    /// A contract was deployed or wired before one of the contracts it references
    MissingDependency {
        /// The contract whose constructor or wiring call needs the dependency
        contract: MarketplaceContract,
        /// The contract with no deployment record
        dependency: MarketplaceContract,
    },
    /// A wiring transaction was attempted before the fee snapshot was taken
    MissingFeeOverrides,
    /// The deployments file was recorded against a different chain
    ChainMismatch {
        /// The chain ID in the deployments file
        recorded: u64,
        /// The chain ID of the connected network
        connected: u64,
    },
    /// A step of the deployment plan failed, aborting the remainder of the run
    StepFailed {
        /// The index of the failing step in the plan
        index: usize,
        /// A description of the failing step
        step: String,
        /// The underlying error
        source: Box<ScriptError>,
    },
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::FeeEstimation(s) => write!(f, "error fetching fee data: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::TransactionReverted(s) => write!(f, "transaction reverted: {}", s),
            ScriptError::MissingDependency {
                contract,
                dependency,
            } => write!(
                f,
                "{} requires {} to be deployed first",
                contract, dependency
            ),
            ScriptError::MissingFeeOverrides => {
                write!(f, "fee overrides must be fetched before wiring contracts")
            }
            ScriptError::ChainMismatch {
                recorded,
                connected,
            } => write!(
                f,
                "deployments were recorded on chain {} but the RPC endpoint is chain {}",
                recorded, connected
            ),
            ScriptError::StepFailed {
                index,
                step,
                source,
            } => write!(f, "step {} ({}) failed: {}", index, step, source),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScriptError::StepFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl ScriptError {
    /// Strip any `StepFailed` wrapping, returning the error that caused the abort
    pub fn root_cause(&self) -> &ScriptError {
        match self {
            ScriptError::StepFailed { source, .. } => source.root_cause(),
            e => e,
        }
    }
}
