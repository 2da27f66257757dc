//! The network-facing side of a deployment: fee estimation, contract creation,
//! and contract calls.
//!
//! [`DeploymentBackend`] is the seam between the orchestrator's ordering logic
//! and the chain. [`RpcBackend`] implements it against a JSON-RPC endpoint.

use std::path::PathBuf;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, TxHash, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};
use alloy_contract::CallDecoder;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{
    artifacts::load_artifact,
    deployments::DeploymentStore,
    errors::ScriptError,
    solidity::{IAppeals, IProviders, IVault},
    types::{DeploymentRecord, FeeOverrides, MarketplaceContract, WiringCall},
    utils::{encode_constructor_args, ensure_success, send_tx, Client, ScriptCallBuilder},
};

/// The operations a deployment run performs against the network
#[allow(async_fn_in_trait)]
pub trait DeploymentBackend {
    /// The address of the account signing deployments and wiring transactions
    fn signer_address(&self) -> Address;

    /// Fetch the fee parameters to apply to the run's wiring transactions
    async fn fee_overrides(&mut self) -> Result<FeeOverrides, ScriptError>;

    /// Deploy the given contract with the given constructor arguments,
    /// returning its address once the creation transaction is confirmed
    async fn deploy(
        &mut self,
        contract: MarketplaceContract,
        args: &[Address],
    ) -> Result<Address, ScriptError>;

    /// Read the vault's protocol balance
    async fn protocol_balance(&mut self, vault: Address) -> Result<U256, ScriptError>;

    /// Send a wiring call to `target` with `argument`, returning the hash of
    /// the transaction once it is confirmed
    async fn send_wiring(
        &mut self,
        call: WiringCall,
        target: Address,
        argument: Address,
        fees: &FeeOverrides,
    ) -> Result<TxHash, ScriptError>;
}

/// Configuration of an [`RpcBackend`]
#[derive(Debug, Clone)]
pub struct RpcBackendConfig {
    /// The directory holding the compiled contract artifacts
    pub artifacts_dir: PathBuf,
    /// Whether to reuse deployments recorded with identical constructor arguments
    pub reuse: bool,
    /// The number of confirmations to wait for on each transaction
    pub confirmations: u64,
    /// Fee parameters to use instead of querying the network
    pub fixed_fees: Option<FeeOverrides>,
}

/// A [`DeploymentBackend`] talking to a live network over JSON-RPC
pub struct RpcBackend {
    /// The client, with the deployer's wallet attached
    client: Client,
    /// The deployments file, updated after every deployment
    store: DeploymentStore,
    /// The backend configuration
    config: RpcBackendConfig,
}

impl RpcBackend {
    /// Create a new backend, binding the deployments file to the client's chain.
    ///
    /// When reusing deployments, a file recorded on another chain is an error.
    /// Otherwise the run records into a file specific to the client's chain.
    pub fn new(
        client: Client,
        mut store: DeploymentStore,
        config: RpcBackendConfig,
    ) -> Result<Self, ScriptError> {
        let store = if config.reuse {
            store.bind_chain(client.chain_id)?;
            store
        } else {
            store.rebind_chain(client.chain_id)?
        };

        Ok(Self {
            client,
            store,
            config,
        })
    }

    /// The deployments file the backend records into
    pub fn deployments(&self) -> &DeploymentStore {
        &self.store
    }
}

impl DeploymentBackend for RpcBackend {
    fn signer_address(&self) -> Address {
        self.client.signer_address
    }

    async fn fee_overrides(&mut self) -> Result<FeeOverrides, ScriptError> {
        if let Some(fees) = self.config.fixed_fees {
            debug!("using fee overrides supplied on the command line");
            return Ok(fees);
        }

        let estimate = self
            .client
            .provider
            .estimate_eip1559_fees()
            .await
            .map_err(|e| ScriptError::FeeEstimation(e.to_string()))?;

        Ok(FeeOverrides {
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
            max_fee_per_gas: estimate.max_fee_per_gas,
        })
    }

    async fn deploy(
        &mut self,
        contract: MarketplaceContract,
        args: &[Address],
    ) -> Result<Address, ScriptError> {
        if self.config.reuse {
            if let Some(address) = self.store.reusable(contract, args) {
                info!("reusing {contract} deployed at {address:#x}");
                return Ok(address);
            }
        }

        let artifact = load_artifact(&self.config.artifacts_dir, contract)?;
        if artifact.constructor_inputs != args.len() {
            return Err(ScriptError::CalldataConstruction(format!(
                "{} constructor takes {} arguments, got {}",
                contract,
                artifact.constructor_inputs,
                args.len()
            )));
        }

        let creation_code = artifact.creation_code(&encode_constructor_args(args));
        let tx = TransactionRequest::default()
            .with_from(self.client.signer_address)
            .with_deploy_code(creation_code);

        let receipt = self
            .client
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .with_required_confirmations(self.config.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let tx_hash = ensure_success(&receipt, &format!("deploy {contract}"))?;
        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "receipt of {contract} creation tx {tx_hash:#x} has no contract address"
            ))
        })?;

        info!(
            "deployed {contract} at {address:#x} (tx {tx_hash:#x}, gas used {}) with args [{}]",
            receipt.gas_used,
            args.iter().map(|a| format!("{a:#x}")).join(", ")
        );

        // Record immediately so that an aborted run leaves a usable deployments file
        self.store.record(
            contract,
            DeploymentRecord {
                address,
                args: args.to_vec(),
            },
        )?;

        Ok(address)
    }

    async fn protocol_balance(&mut self, vault: Address) -> Result<U256, ScriptError> {
        let vault = IVault::new(vault, self.client.provider.clone());
        let balance = vault
            .getProtocolBalance()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(balance)
    }

    async fn send_wiring(
        &mut self,
        call: WiringCall,
        target: Address,
        argument: Address,
        fees: &FeeOverrides,
    ) -> Result<TxHash, ScriptError> {
        let provider = self.client.provider.clone();
        let confirmations = self.config.confirmations;
        let description = format!("{call}({argument:#x})");

        // The call builders borrow these instances
        let vault = IVault::new(target, provider.clone());
        let appeals = IAppeals::new(target, provider.clone());
        let providers = IProviders::new(target, provider);

        let res = match call {
            WiringCall::SetAppealsRole => {
                let tx = with_fees(vault.setAppealsRole(argument), fees);
                send_tx(tx, confirmations, &description).await
            }
            WiringCall::SetProvidersRole => {
                let tx = with_fees(vault.setProvidersRole(argument), fees);
                send_tx(tx, confirmations, &description).await
            }
            WiringCall::SetDealsRole => {
                let tx = with_fees(vault.setDealsRole(argument), fees);
                send_tx(tx, confirmations, &description).await
            }
            WiringCall::AppealsSetDealsAddress => {
                let tx = with_fees(appeals.setDealsAddress(argument), fees);
                send_tx(tx, confirmations, &description).await
            }
            WiringCall::ProvidersSetDealsAddress => {
                let tx = with_fees(providers.setDealsAddress(argument), fees);
                send_tx(tx, confirmations, &description).await
            }
        };

        res.inspect_err(|e| warn!("{description} on {target:#x} failed: {e}"))
    }
}

/// Apply the run's fee snapshot to a contract call
fn with_fees<'a, C: CallDecoder>(
    tx: ScriptCallBuilder<'a, C>,
    fees: &FeeOverrides,
) -> ScriptCallBuilder<'a, C> {
    tx.max_fee_per_gas(fees.max_fee_per_gas)
        .max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
}
