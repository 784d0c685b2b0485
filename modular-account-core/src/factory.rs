//! On-chain interfaces this core encodes calls against.
//!
//! Only calldata construction and revert decoding happen here; contract
//! calls go through the execution layer.

use alloy_core::sol;

sol! {
    /// Deployment surface of the Modular Account v2 factory.
    ///
    /// `createSemiModularAccount` and `createWebAuthnAccount` are the two
    /// calls that appear inside init code; `createAccount` deploys the
    /// fully-modular variant.
    #[allow(missing_docs)]
    interface AccountFactory {
        function createAccount(address owner, uint256 salt, uint32 entityId) external returns (address);
        function createSemiModularAccount(address owner, uint256 salt) external returns (address);
        function createWebAuthnAccount(uint256 ownerX, uint256 ownerY, uint256 salt, uint32 entityId) external returns (address);
    }

    /// The slice of the v0.7 entry point used for counterfactual address
    /// resolution: `getSenderAddress` always reverts, answering with
    /// `SenderAddressResult`.
    #[allow(missing_docs)]
    interface IEntryPoint {
        function getSenderAddress(bytes initCode) external;
        error SenderAddressResult(address sender);
    }
}
