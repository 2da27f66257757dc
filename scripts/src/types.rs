//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::constants::{
    APPEALS_CONTRACT_KEY, DEALS_CONTRACT_KEY, PROVIDERS_CONTRACT_KEY, SETTINGS_CONTRACT_KEY,
    VAULT_CONTRACT_KEY,
};

/// The contracts making up the marketplace, in deployment order
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarketplaceContract {
    /// The protocol settings registry
    Settings,
    /// The vault holding protocol and user funds
    Vault,
    /// The appeals module
    Appeals,
    /// The storage providers registry
    Providers,
    /// The deals module
    Deals,
}

impl MarketplaceContract {
    /// All contracts, in the order in which they must be deployed
    pub const ALL: [MarketplaceContract; 5] = [
        MarketplaceContract::Settings,
        MarketplaceContract::Vault,
        MarketplaceContract::Appeals,
        MarketplaceContract::Providers,
        MarketplaceContract::Deals,
    ];

    /// The name of the contract's compilation artifact
    pub fn name(&self) -> &'static str {
        match self {
            MarketplaceContract::Settings => "Settings",
            MarketplaceContract::Vault => "Vault",
            MarketplaceContract::Appeals => "Appeals",
            MarketplaceContract::Providers => "Providers",
            MarketplaceContract::Deals => "Deals",
        }
    }

    /// The contract's key in the `deployments.json` file
    pub fn deployment_key(&self) -> &'static str {
        match self {
            MarketplaceContract::Settings => SETTINGS_CONTRACT_KEY,
            MarketplaceContract::Vault => VAULT_CONTRACT_KEY,
            MarketplaceContract::Appeals => APPEALS_CONTRACT_KEY,
            MarketplaceContract::Providers => PROVIDERS_CONTRACT_KEY,
            MarketplaceContract::Deals => DEALS_CONTRACT_KEY,
        }
    }

    /// The contracts whose addresses are passed to this contract's constructor, in order.
    ///
    /// The settings contract has no contract dependencies, its only constructor
    /// argument is the owner address.
    pub fn dependencies(&self) -> &'static [MarketplaceContract] {
        use MarketplaceContract::*;
        match self {
            Settings => &[],
            Vault => &[Settings],
            Appeals => &[Settings, Vault],
            Providers => &[Settings, Vault, Appeals],
            Deals => &[Settings, Vault, Appeals, Providers],
        }
    }
}

impl Display for MarketplaceContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A contract deployed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// The address of the deployed contract
    pub address: Address,
    /// The constructor arguments the contract was deployed with
    pub args: Vec<Address>,
}

/// Gas fee parameters applied to the wiring transactions of a run
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FeeOverrides {
    /// The max priority fee per gas, in wei
    pub max_priority_fee_per_gas: u128,
    /// The max fee per gas, in wei
    pub max_fee_per_gas: u128,
}

impl Display for FeeOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "maxPriorityFeePerGas: {}, maxFeePerGas: {}",
            self.max_priority_fee_per_gas, self.max_fee_per_gas
        )
    }
}

/// A post-deployment transaction registering one contract's address with another
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WiringCall {
    /// Grant the appeals contract its role on the vault
    SetAppealsRole,
    /// Grant the providers contract its role on the vault
    SetProvidersRole,
    /// Grant the deals contract its role on the vault
    SetDealsRole,
    /// Register the deals contract with the appeals contract
    AppealsSetDealsAddress,
    /// Register the deals contract with the providers contract
    ProvidersSetDealsAddress,
}

impl WiringCall {
    /// All wiring calls, in the order in which they are sent
    pub const ALL: [WiringCall; 5] = [
        WiringCall::SetAppealsRole,
        WiringCall::SetProvidersRole,
        WiringCall::SetDealsRole,
        WiringCall::AppealsSetDealsAddress,
        WiringCall::ProvidersSetDealsAddress,
    ];

    /// The contract the call is sent to
    pub fn target(&self) -> MarketplaceContract {
        match self {
            WiringCall::SetAppealsRole | WiringCall::SetProvidersRole | WiringCall::SetDealsRole => {
                MarketplaceContract::Vault
            }
            WiringCall::AppealsSetDealsAddress => MarketplaceContract::Appeals,
            WiringCall::ProvidersSetDealsAddress => MarketplaceContract::Providers,
        }
    }

    /// The contract whose address is passed as the call's argument
    pub fn argument(&self) -> MarketplaceContract {
        match self {
            WiringCall::SetAppealsRole => MarketplaceContract::Appeals,
            WiringCall::SetProvidersRole => MarketplaceContract::Providers,
            WiringCall::SetDealsRole
            | WiringCall::AppealsSetDealsAddress
            | WiringCall::ProvidersSetDealsAddress => MarketplaceContract::Deals,
        }
    }

    /// The name of the Solidity method invoked
    pub fn method(&self) -> &'static str {
        match self {
            WiringCall::SetAppealsRole => "setAppealsRole",
            WiringCall::SetProvidersRole => "setProvidersRole",
            WiringCall::SetDealsRole => "setDealsRole",
            WiringCall::AppealsSetDealsAddress | WiringCall::ProvidersSetDealsAddress => {
                "setDealsAddress"
            }
        }
    }
}

impl Display for WiringCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target(), self.method())
    }
}

/// The outcome of a successful run of a deployment plan
#[derive(Debug, Clone)]
pub struct DeploymentSummary {
    /// The deployment record of every contract touched by the run, in deployment order
    pub records: Vec<(MarketplaceContract, DeploymentRecord)>,
    /// The fee snapshot used for the run's wiring transactions
    pub fees: Option<FeeOverrides>,
    /// The vault's protocol balance, as read during the run
    pub protocol_balance: Option<U256>,
    /// The hash of each confirmed wiring transaction
    pub wiring_txs: Vec<(WiringCall, TxHash)>,
}

impl DeploymentSummary {
    /// Get the address of the given contract, if the run has a record of it
    pub fn address_of(&self, contract: MarketplaceContract) -> Option<Address> {
        self.records
            .iter()
            .find(|(c, _)| *c == contract)
            .map(|(_, record)| record.address)
    }
}

#[cfg(test)]
mod tests {
    use super::{MarketplaceContract, WiringCall};

    #[test]
    fn test_dependencies_precede_dependents() {
        for (i, contract) in MarketplaceContract::ALL.iter().enumerate() {
            for dep in contract.dependencies() {
                let dep_idx = MarketplaceContract::ALL
                    .iter()
                    .position(|c| c == dep)
                    .unwrap();
                assert!(dep_idx < i, "{} depends on later contract {}", contract, dep);
            }
        }
    }

    #[test]
    fn test_wiring_targets() {
        let vault_calls = WiringCall::ALL
            .iter()
            .filter(|c| c.target() == MarketplaceContract::Vault)
            .count();
        assert_eq!(vault_calls, 3);

        assert_eq!(
            WiringCall::ProvidersSetDealsAddress.to_string(),
            "Providers.setDealsAddress"
        );
        assert_eq!(
            WiringCall::AppealsSetDealsAddress.argument(),
            MarketplaceContract::Deals
        );
    }
}
