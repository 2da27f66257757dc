//! Utilities for the deployment scripts.

use std::str::FromStr;

use alloy::{
    network::Ethereum,
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_contract::{CallBuilder, CallDecoder};

use crate::errors::ScriptError;

/// The call builder type for contract method calls
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a DynProvider, C, Ethereum>;

/// A client connected to the target network with the deployer's wallet attached
#[derive(Clone)]
pub struct Client {
    /// The provider, signing transactions with the deployer's key
    pub provider: DynProvider,
    /// The address of the deployer
    pub signer_address: Address,
    /// The chain ID of the network
    pub chain_id: u64,
}

/// Sets up the client with which to deploy and interact with the contracts,
/// from the deployer's private key and the network's RPC url.
pub async fn setup_client(priv_key: &str, rpc_url: &str) -> Result<Client, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let signer_address = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
    let provider = DynProvider::new(provider);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    Ok(Client {
        provider,
        signer_address,
        chain_id,
    })
}

/// Parse a hex-encoded address supplied on the command line
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// ABI-encode a list of address constructor arguments.
///
/// Addresses are static types, so the encoding is the concatenation of each
/// address left-padded to a 32 byte word.
pub fn encode_constructor_args(args: &[Address]) -> Vec<u8> {
    args.iter().flat_map(|addr| addr.into_word().0).collect()
}

/// Ensure a mined transaction succeeded, returning its hash
pub fn ensure_success(receipt: &TransactionReceipt, description: &str) -> Result<TxHash, ScriptError> {
    if receipt.status() {
        Ok(receipt.transaction_hash)
    } else {
        Err(ScriptError::TransactionReverted(format!(
            "{} (tx {:#x})",
            description, receipt.transaction_hash
        )))
    }
}

/// Send a contract method call, wait for the given number of confirmations,
/// and ensure the transaction succeeded
pub async fn send_tx<C: CallDecoder>(
    tx: ScriptCallBuilder<'_, C>,
    confirmations: u64,
    description: &str,
) -> Result<TxHash, ScriptError> {
    let receipt = tx
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .with_required_confirmations(confirmations)
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    ensure_success(&receipt, description)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address};

    use super::{encode_constructor_args, parse_address};

    #[test]
    fn test_encode_constructor_args() {
        let settings = address!("0x00000000000000000000000000000000000000aa");
        let vault = address!("0x00000000000000000000000000000000000000bb");

        let encoded = encode_constructor_args(&[settings, vault]);
        assert_eq!(encoded.len(), 64);
        assert!(encoded[..31].iter().all(|b| *b == 0));
        assert_eq!(encoded[31], 0xaa);
        assert!(encoded[32..63].iter().all(|b| *b == 0));
        assert_eq!(encoded[63], 0xbb);
    }

    #[test]
    fn test_encode_no_args() {
        assert!(encode_constructor_args(&[]).is_empty());
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x00000000000000000000000000000000000000aa").unwrap();
        assert_eq!(addr, Address::with_last_byte(0xaa));
        assert!(parse_address("0xnot-an-address").is_err());
    }
}
