//! Implementations of the deployment commands

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    backend::{RpcBackend, RpcBackendConfig},
    cli::{DeployAllArgs, TxArgs, WireArgs},
    constants::DEFAULT_ARTIFACTS_DIR,
    deployments::DeploymentStore,
    errors::ScriptError,
    orchestrator::{DeploymentPlan, Orchestrator},
    types::DeploymentSummary,
    utils::{parse_address, Client},
};

/// Deploy every contract in dependency order, then wire them together
pub async fn deploy_all(
    args: DeployAllArgs,
    client: Client,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let owner = match args.owner.as_deref() {
        Some(owner) => parse_address(owner)?,
        None => client.signer_address,
    };

    let store = DeploymentStore::load(deployments_path)?;
    let config = backend_config(&args.tx, PathBuf::from(args.artifacts_dir), args.reuse)?;
    let backend = RpcBackend::new(client, store, config)?;

    let mut orchestrator = Orchestrator::new(backend, owner);
    let summary = orchestrator.run(&DeploymentPlan::full()).await?;

    log_summary(&summary, orchestrator.backend().deployments().path());
    Ok(())
}

/// Send the wiring transactions against the contracts recorded in the deployments file
pub async fn wire(args: WireArgs, client: Client, deployments_path: &str) -> Result<(), ScriptError> {
    let mut store = DeploymentStore::load(deployments_path)?;
    store.bind_chain(client.chain_id)?;
    let records = store.wiring_records()?;

    let owner = client.signer_address;
    let config = backend_config(&args.tx, PathBuf::from(DEFAULT_ARTIFACTS_DIR), false)?;
    let backend = RpcBackend::new(client, store, config)?;

    let mut orchestrator = Orchestrator::new(backend, owner).with_records(records);
    let summary = orchestrator.run(&DeploymentPlan::wiring()).await?;

    log_summary(&summary, orchestrator.backend().deployments().path());
    Ok(())
}

/// Build the RPC backend configuration from the command line arguments
fn backend_config(
    tx: &TxArgs,
    artifacts_dir: PathBuf,
    reuse: bool,
) -> Result<RpcBackendConfig, ScriptError> {
    Ok(RpcBackendConfig {
        artifacts_dir,
        reuse,
        confirmations: tx.confirmations,
        fixed_fees: tx.fixed_fees()?,
    })
}

/// Log the outcome of a successful run
fn log_summary(summary: &DeploymentSummary, deployments_path: &Path) {
    for (contract, record) in summary.records.iter() {
        info!("{}: {:#x}", contract, record.address);
    }
    info!(
        "{} wiring transactions confirmed, deployments recorded in {}",
        summary.wiring_txs.len(),
        deployments_path.display()
    );
}
