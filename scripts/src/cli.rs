//! Definitions of CLI arguments and commands for the deployment scripts

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy_all, wire},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_NUM_CONFIRMATIONS,
        DEFAULT_RPC_URL, PRIV_KEY_ENV_VAR, RPC_URL_ENV_VAR,
    },
    errors::ScriptError,
    types::FeeOverrides,
    utils::Client,
};

/// Deploy and wire the marketplace contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = PRIV_KEY_ENV_VAR)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = RPC_URL_ENV_VAR, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path to the file recording deployed contract addresses
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The available commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy every contract, then wire them together
    DeployAll(DeployAllArgs),
    /// Wire together contracts already recorded in the deployments file
    Wire(WireArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, client: Client, deployments_path: &str) -> Result<(), ScriptError> {
        match self {
            Command::DeployAll(args) => deploy_all(args, client, deployments_path).await,
            Command::Wire(args) => wire(args, client, deployments_path).await,
        }
    }
}

/// Deploy the settings, vault, appeals, providers, and deals contracts,
/// then grant each contract the roles it needs on the others.
#[derive(Args)]
pub struct DeployAllArgs {
    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: String,

    /// Owner of the settings contract in hex, defaults to the deployer
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Reuse contracts already recorded in the deployments file with
    /// identical constructor arguments instead of redeploying them
    #[arg(long)]
    pub reuse: bool,

    /// Transaction settings
    #[command(flatten)]
    pub tx: TxArgs,
}

/// Send the wiring transactions against already deployed contracts.
///
/// Used to finish a run that deployed every contract but aborted while wiring.
#[derive(Args)]
pub struct WireArgs {
    /// Transaction settings
    #[command(flatten)]
    pub tx: TxArgs,
}

/// Settings applied to every transaction of a run
#[derive(Args)]
pub struct TxArgs {
    /// Number of confirmations to wait for on each transaction
    #[arg(long, default_value_t = DEFAULT_NUM_CONFIRMATIONS)]
    pub confirmations: u64,

    /// Max fee per gas in wei for wiring transactions, instead of the network estimate
    #[arg(long, requires = "max_priority_fee_per_gas")]
    pub max_fee_per_gas: Option<u128>,

    /// Max priority fee per gas in wei for wiring transactions, instead of the network estimate
    #[arg(long, requires = "max_fee_per_gas")]
    pub max_priority_fee_per_gas: Option<u128>,
}

impl TxArgs {
    /// The fee overrides given on the command line, if any
    pub fn fixed_fees(&self) -> Result<Option<FeeOverrides>, ScriptError> {
        match (self.max_fee_per_gas, self.max_priority_fee_per_gas) {
            (Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) => {
                if max_priority_fee_per_gas > max_fee_per_gas {
                    return Err(ScriptError::FeeEstimation(format!(
                        "max priority fee {} exceeds max fee {}",
                        max_priority_fee_per_gas, max_fee_per_gas
                    )));
                }

                Ok(Some(FeeOverrides {
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn test_parse_deploy_all() {
        let cli = Cli::try_parse_from([
            "marketplace-scripts",
            "--priv-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "deploy-all",
            "--reuse",
            "--max-fee-per-gas",
            "30000000000",
            "--max-priority-fee-per-gas",
            "1500000000",
        ])
        .unwrap();

        assert_eq!(cli.deployments_path, "deployments.json");
        match cli.command {
            Command::DeployAll(args) => {
                assert!(args.reuse);
                assert_eq!(args.tx.confirmations, 1);
                let fees = args.tx.fixed_fees().unwrap().unwrap();
                assert_eq!(fees.max_fee_per_gas, 30_000_000_000);
                assert_eq!(fees.max_priority_fee_per_gas, 1_500_000_000);
            }
            Command::Wire(_) => panic!("expected deploy-all"),
        }
    }

    #[test]
    fn test_fee_flags_required_together() {
        let res = Cli::try_parse_from([
            "marketplace-scripts",
            "--priv-key",
            "0x01",
            "wire",
            "--max-fee-per-gas",
            "30000000000",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_priority_fee_above_max_rejected() {
        let cli = Cli::try_parse_from([
            "marketplace-scripts",
            "--priv-key",
            "0x01",
            "wire",
            "--max-fee-per-gas",
            "1",
            "--max-priority-fee-per-gas",
            "2",
        ])
        .unwrap();

        match cli.command {
            Command::Wire(args) => assert!(args.tx.fixed_fees().is_err()),
            Command::DeployAll(_) => panic!("expected wire"),
        }
    }
}
