//! Constants used in the deployment scripts

/// The default RPC URL, a local devnet node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default directory containing the compiled contract artifacts,
/// laid out as `<dir>/<Name>.sol/<Name>.json`
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts/contracts";

/// The extension of a Solidity source directory in the artifacts tree
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The extension of a compiled artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The default number of confirmations to wait for each deployment or wiring transaction
pub const DEFAULT_NUM_CONFIRMATIONS: u64 = 1;

/// The settings contract key in the `deployments.json` file
pub const SETTINGS_CONTRACT_KEY: &str = "settings_contract";

/// The vault contract key in the `deployments.json` file
pub const VAULT_CONTRACT_KEY: &str = "vault_contract";

/// The appeals contract key in the `deployments.json` file
pub const APPEALS_CONTRACT_KEY: &str = "appeals_contract";

/// The providers contract key in the `deployments.json` file
pub const PROVIDERS_CONTRACT_KEY: &str = "providers_contract";

/// The deals contract key in the `deployments.json` file
pub const DEALS_CONTRACT_KEY: &str = "deals_contract";

/// The name of the environment variable holding the deployer's private key
pub const PRIV_KEY_ENV_VAR: &str = "PKEY";

/// The name of the environment variable holding the RPC URL
pub const RPC_URL_ENV_VAR: &str = "RPC_URL";

/// The default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
