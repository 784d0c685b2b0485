//! Pure counterfactual address prediction for factory-deployed accounts.
//!
//! Replicates, byte for byte, the address derivation the factory performs
//! on chain: a CREATE2 hash over the factory address, the owner-salted
//! deployment salt, and the hash of the proxy creation code. No network
//! access; feeding the same inputs always yields the same address.

use alloy_primitives::{bytes, keccak256, Address, Bytes, B256, U256};

/// Which proxy shape the factory deploys for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountVariant {
    /// Semi-modular bytecode account: the owner is appended to the proxy as
    /// an immutable argument.
    SemiModular,
    /// Fully-modular account: a plain ERC-1967 proxy; the owner is
    /// installed post-deployment.
    Modular,
}

/// Runtime portion of the ERC-1967 minimal proxy the factory's
/// deterministic-deployment library emits.
static ERC1967_PROXY_RUNTIME: Bytes = bytes!(
    "363d3d373d3d363d7f360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc545af43d6000803e6038573d6000fd5b3d6000f3"
);

/// Constructor prefix for the argument-carrying proxy form; the two bytes
/// after `0x61` are the runtime length including the immutable arguments.
static PROXY_CONSTRUCTOR_ARGS_PREFIX: Bytes = bytes!("3d8160233d3973");

/// Constructor prefix for the plain proxy form (fixed runtime length 0x3d).
static PROXY_CONSTRUCTOR_PREFIX: Bytes = bytes!("603d3d8160223d3973");

/// Constructor suffix: stores the implementation in the ERC-1967 slot and
/// returns the runtime.
static PROXY_CONSTRUCTOR_SUFFIX: Bytes = bytes!("60095155f3");

/// The deployment salt the factory derives from the owner and the
/// caller-chosen salt: `keccak256(abi.encodePacked(owner, salt))`.
#[must_use]
pub fn combined_salt(owner: Address, salt: U256) -> B256 {
    let mut packed = [0u8; 52];
    packed[..20].copy_from_slice(owner.as_slice());
    packed[20..].copy_from_slice(&salt.to_be_bytes::<32>());
    keccak256(packed)
}

/// Assembles the proxy creation code the factory would execute for
/// `implementation`, with the owner appended as an immutable argument when
/// present.
fn proxy_creation_code(implementation: Address, immutable_owner: Option<Address>) -> Vec<u8> {
    let mut code = Vec::with_capacity(
        PROXY_CONSTRUCTOR_PREFIX.len()
            + Address::len_bytes() * 2
            + PROXY_CONSTRUCTOR_SUFFIX.len()
            + ERC1967_PROXY_RUNTIME.len()
            + 3,
    );

    if let Some(owner) = immutable_owner {
        let runtime_len: u16 = 61 + 20; // runtime + packed owner argument
        code.push(0x61);
        code.extend_from_slice(&runtime_len.to_be_bytes());
        code.extend_from_slice(&PROXY_CONSTRUCTOR_ARGS_PREFIX);
        code.extend_from_slice(implementation.as_slice());
        code.extend_from_slice(&PROXY_CONSTRUCTOR_SUFFIX);
        code.extend_from_slice(&ERC1967_PROXY_RUNTIME);
        code.extend_from_slice(owner.as_slice());
    } else {
        code.extend_from_slice(&PROXY_CONSTRUCTOR_PREFIX);
        code.extend_from_slice(implementation.as_slice());
        code.extend_from_slice(&PROXY_CONSTRUCTOR_SUFFIX);
        code.extend_from_slice(&ERC1967_PROXY_RUNTIME);
    }

    code
}

/// Predicts the address a Modular Account v2 factory deployment will land
/// on, without any network call.
///
/// Callers must not assume address stability across implementation
/// upgrades: changing `implementation` changes the result even for an
/// identical owner and salt. Distinct salts give one owner arbitrarily many
/// distinct accounts.
#[must_use]
pub fn predict_modular_account_v2_address(
    factory: Address,
    implementation: Address,
    salt: U256,
    variant: AccountVariant,
    owner: Address,
) -> Address {
    let creation_code = match variant {
        AccountVariant::SemiModular => proxy_creation_code(implementation, Some(owner)),
        AccountVariant::Modular => proxy_creation_code(implementation, None),
    };

    factory.create2(combined_salt(owner, salt), keccak256(&creation_code))
}
