//! Deployment constants for Modular Account v2.
//!
//! The factory and implementation contracts are deployed deterministically,
//! so these addresses are identical on every supported chain.

use alloy_primitives::{address, Address};

/// The validation entity id of the canonical account owner.
pub const DEFAULT_OWNER_ENTITY_ID: u32 = 0;

/// The account factory handling `createAccount` and
/// `createSemiModularAccount` deployments.
pub static DEFAULT_FACTORY: Address =
    address!("0x00000000000017c61b5bee81050ec8efc9c6fecd");

/// The semi-modular bytecode account implementation behind the proxies the
/// factory deploys.
pub static DEFAULT_SEMI_MODULAR_IMPLEMENTATION: Address =
    address!("0x000000000000c5a9089039570dd36455b5c07383");

/// The factory handling `createWebAuthnAccount` deployments.
pub static DEFAULT_WEBAUTHN_FACTORY: Address =
    address!("0x0000000000001d9d34e07d9834274df9ae575217");

/// The implementation an EIP-7702 account delegates to.
pub static EIP7702_IMPLEMENTATION: Address =
    address!("0x69007702764179f14f51cdce752f4f775d74e139");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_distinct() {
        let all = [
            DEFAULT_FACTORY,
            DEFAULT_SEMI_MODULAR_IMPLEMENTATION,
            DEFAULT_WEBAUTHN_FACTORY,
            EIP7702_IMPLEMENTATION,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(!a.is_zero());
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
