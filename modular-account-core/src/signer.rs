use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_OWNER_ENTITY_ID;

/// The identity seam between this core and whatever actually holds keys.
///
/// Address derivation only ever needs the signer's address; message and
/// user-operation signing live in outer layers behind this same trait, so a
/// local private key, a hardware wallet, or a remote signing service all
/// plug in the same way.
pub trait SmartAccountSigner: Send + Sync {
    /// The EOA address of the signer.
    fn address(&self) -> Address;
}

/// A signer known only by its address.
///
/// Used by the wire-level creation path (where a JSON payload can carry an
/// address but not a live key handle) and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSigner(pub Address);

impl SmartAccountSigner for StaticSigner {
    fn address(&self) -> Address {
        self.0
    }
}

impl SmartAccountSigner for Address {
    fn address(&self) -> Address {
        *self
    }
}

impl From<Address> for StaticSigner {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

/// Identifies which validation slot of the modular account a signer
/// occupies.
///
/// `entity_id` [`DEFAULT_OWNER_ENTITY_ID`] is the canonical owner slot;
/// other ids denote delegated signers installed as additional validation
/// modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerEntity {
    /// Whether the entity validates globally (across all selectors) rather
    /// than per-selector.
    pub is_global_validation: bool,
    /// The validation entity id within the account.
    pub entity_id: u32,
}

impl Default for SignerEntity {
    fn default() -> Self {
        Self {
            is_global_validation: true,
            entity_id: DEFAULT_OWNER_ENTITY_ID,
        }
    }
}

impl SignerEntity {
    /// A globally-validating entity with the given id.
    #[must_use]
    pub const fn new(entity_id: u32) -> Self {
        Self {
            is_global_validation: true,
            entity_id,
        }
    }

    /// Whether this entity occupies the canonical owner slot.
    #[must_use]
    pub const fn is_owner(&self) -> bool {
        self.entity_id == DEFAULT_OWNER_ENTITY_ID
    }
}
