//! The deployment orchestrator.
//!
//! A run executes a [`DeploymentPlan`], an ordered list of [`Step`]s, strictly
//! sequentially: each step is awaited to completion before the next is issued,
//! and the first failing step aborts the run. Nothing already done on-chain is
//! rolled back.

use std::fmt::{self, Display};

use alloy::primitives::{Address, TxHash, U256};
use tracing::info;

use crate::{
    backend::DeploymentBackend,
    errors::ScriptError,
    types::{DeploymentRecord, DeploymentSummary, FeeOverrides, MarketplaceContract, WiringCall},
};

/// A single step of a deployment plan
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    /// Take the fee snapshot used by every wiring transaction of the run
    FetchFees,
    /// Deploy a contract
    Deploy(MarketplaceContract),
    /// Read the vault's protocol balance
    ReadProtocolBalance,
    /// Send a wiring transaction
    Wire(WiringCall),
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::FetchFees => write!(f, "fetch fee data"),
            Step::Deploy(contract) => write!(f, "deploy {}", contract),
            Step::ReadProtocolBalance => write!(f, "read vault protocol balance"),
            Step::Wire(call) => write!(f, "{}", call),
        }
    }
}

/// An ordered list of steps, executed fail-fast by the [`Orchestrator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// The steps, in execution order
    steps: Vec<Step>,
}

impl DeploymentPlan {
    /// Deploy every contract, then wire them together
    pub fn full() -> Self {
        let steps = [Step::FetchFees]
            .into_iter()
            .chain(MarketplaceContract::ALL.into_iter().map(Step::Deploy))
            .chain([Step::ReadProtocolBalance])
            .chain(WiringCall::ALL.into_iter().map(Step::Wire))
            .collect();

        Self { steps }
    }

    /// Wire together already deployed contracts
    pub fn wiring() -> Self {
        let steps = [Step::FetchFees, Step::ReadProtocolBalance]
            .into_iter()
            .chain(WiringCall::ALL.into_iter().map(Step::Wire))
            .collect();

        Self { steps }
    }

    /// The plan's steps, in execution order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Drives a [`DeploymentPlan`] against a [`DeploymentBackend`]
pub struct Orchestrator<B> {
    /// The backend executing the plan's network operations
    backend: B,
    /// The owner passed to the settings contract's constructor
    owner: Address,
    /// The contracts deployed (or loaded) so far, in order
    records: Vec<(MarketplaceContract, DeploymentRecord)>,
    /// The run's fee snapshot
    fees: Option<FeeOverrides>,
    /// The vault's protocol balance, once read
    protocol_balance: Option<U256>,
    /// The confirmed wiring transactions
    wiring_txs: Vec<(WiringCall, TxHash)>,
}

impl<B: DeploymentBackend> Orchestrator<B> {
    /// Create an orchestrator deploying the settings contract with the given owner
    pub fn new(backend: B, owner: Address) -> Self {
        Self {
            backend,
            owner,
            records: Vec::new(),
            fees: None,
            protocol_balance: None,
            wiring_txs: Vec::new(),
        }
    }

    /// Seed the orchestrator with contracts deployed in a previous run
    pub fn with_records(
        mut self,
        records: impl IntoIterator<Item = (MarketplaceContract, DeploymentRecord)>,
    ) -> Self {
        self.records.extend(records);
        self
    }

    /// The backend driven by the orchestrator
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute every step of the plan in order, aborting at the first failure
    pub async fn run(&mut self, plan: &DeploymentPlan) -> Result<DeploymentSummary, ScriptError> {
        info!("deployer address: {:#x}", self.backend.signer_address());

        let n_steps = plan.steps().len();
        for (index, step) in plan.steps().iter().enumerate() {
            info!("[{}/{}] {}", index + 1, n_steps, step);
            self.execute(*step)
                .await
                .map_err(|e| ScriptError::StepFailed {
                    index,
                    step: step.to_string(),
                    source: Box::new(e),
                })?;
        }

        Ok(DeploymentSummary {
            records: self.records.clone(),
            fees: self.fees,
            protocol_balance: self.protocol_balance,
            wiring_txs: self.wiring_txs.clone(),
        })
    }

    /// Execute a single step
    async fn execute(&mut self, step: Step) -> Result<(), ScriptError> {
        match step {
            Step::FetchFees => {
                let fees = self.backend.fee_overrides().await?;
                info!("fee overrides: {}", fees);
                self.fees = Some(fees);
            }
            Step::Deploy(contract) => {
                if self.address_of(contract).is_some() {
                    return Err(ScriptError::ContractDeployment(format!(
                        "{} was already deployed in this run",
                        contract
                    )));
                }

                let args = self.constructor_args(contract)?;
                let address = self.backend.deploy(contract, &args).await?;
                info!("{} address: {:#x}", contract, address);
                self.records
                    .push((contract, DeploymentRecord { address, args }));
            }
            Step::ReadProtocolBalance => {
                let vault = self.resolve(MarketplaceContract::Vault, MarketplaceContract::Vault)?;
                let balance = self.backend.protocol_balance(vault).await?;
                info!("vault protocol balance: {}", balance);
                self.protocol_balance = Some(balance);
            }
            Step::Wire(call) => {
                let fees = self.fees.ok_or(ScriptError::MissingFeeOverrides)?;
                let target = self.resolve(call.target(), call.target())?;
                let argument = self.resolve(call.target(), call.argument())?;

                let tx_hash = self
                    .backend
                    .send_wiring(call, target, argument, &fees)
                    .await?;
                info!("{}({:#x}) confirmed in tx {:#x}", call, argument, tx_hash);
                self.wiring_txs.push((call, tx_hash));
            }
        }

        Ok(())
    }

    /// The address of the given contract, if it has been deployed
    fn address_of(&self, contract: MarketplaceContract) -> Option<Address> {
        self.records
            .iter()
            .find(|(c, _)| *c == contract)
            .map(|(_, record)| record.address)
    }

    /// The address of `dependency`, which `contract` requires to already be deployed
    fn resolve(
        &self,
        contract: MarketplaceContract,
        dependency: MarketplaceContract,
    ) -> Result<Address, ScriptError> {
        self.address_of(dependency)
            .ok_or(ScriptError::MissingDependency {
                contract,
                dependency,
            })
    }

    /// The constructor arguments of the given contract, resolved from earlier deployments
    fn constructor_args(&self, contract: MarketplaceContract) -> Result<Vec<Address>, ScriptError> {
        if contract == MarketplaceContract::Settings {
            return Ok(vec![self.owner]);
        }

        contract
            .dependencies()
            .iter()
            .map(|dep| self.resolve(contract, *dep))
            .collect()
    }
}
