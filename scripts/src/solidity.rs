//! Definitions of Solidity functions called while wiring the deployed contracts

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IVault {
        function getProtocolBalance() external view returns (uint256);
        function setAppealsRole(address appeals) external;
        function setProvidersRole(address providers) external;
        function setDealsRole(address deals) external;
    }
}

sol! {
    #[sol(rpc)]
    interface IAppeals {
        function setDealsAddress(address deals) external;
    }
}

sol! {
    #[sol(rpc)]
    interface IProviders {
        function setDealsAddress(address deals) external;
    }
}
