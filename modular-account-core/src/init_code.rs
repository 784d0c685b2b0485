use alloy_core::sol_types::SolCall;
use alloy_primitives::{Address, Bytes, U256};

use crate::credential::PublicKey;
use crate::factory::AccountFactory;

/// The deployment payload recipe for an account.
///
/// Init code is the factory address followed by the encoded factory call; a
/// bundler submits it once, the first time a not-yet-deployed account is
/// used. The recipe captures its construction-time parameters so
/// [`compute`](Self::compute) is pure: repeated calls return byte-identical
/// output for the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitCode {
    /// The account already exists on chain; there is nothing to deploy.
    Deployed,
    /// A caller-supplied payload, passed through untouched.
    Explicit(Bytes),
    /// `createSemiModularAccount(owner, salt)` on the factory.
    SemiModular {
        /// The factory to deploy through.
        factory: Address,
        /// The owner baked into the account.
        owner: Address,
        /// Salt distinguishing multiple accounts of one owner.
        salt: U256,
    },
    /// `createWebAuthnAccount(x, y, salt, entityId)` on the webauthn
    /// factory.
    Webauthn {
        /// The factory to deploy through.
        factory: Address,
        /// The passkey's EC point, the account's validator key.
        key: PublicKey,
        /// Salt distinguishing multiple accounts of one passkey.
        salt: U256,
        /// The validation entity id the key occupies.
        entity_id: u32,
    },
}

impl InitCode {
    /// Assembles the deployment payload.
    ///
    /// Pure and idempotent; returns the empty payload for accounts that need
    /// no deployment.
    #[must_use]
    pub fn compute(&self) -> Bytes {
        match self {
            Self::Deployed => Bytes::new(),
            Self::Explicit(bytes) => bytes.clone(),
            Self::SemiModular {
                factory,
                owner,
                salt,
            } => with_factory(
                *factory,
                &AccountFactory::createSemiModularAccountCall {
                    owner: *owner,
                    salt: *salt,
                }
                .abi_encode(),
            ),
            Self::Webauthn {
                factory,
                key,
                salt,
                entity_id,
            } => with_factory(
                *factory,
                &AccountFactory::createWebAuthnAccountCall {
                    ownerX: key.x,
                    ownerY: key.y,
                    salt: *salt,
                    entityId: *entity_id,
                }
                .abi_encode(),
            ),
        }
    }

    /// Whether this recipe denotes an already-deployed account.
    #[must_use]
    pub const fn is_deployed(&self) -> bool {
        matches!(self, Self::Deployed)
    }
}

fn with_factory(factory: Address, call: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(Address::len_bytes() + call.len());
    out.extend_from_slice(factory.as_slice());
    out.extend_from_slice(call);
    out.into()
}
