use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Supported ERC-4337 entry point protocol versions.
///
/// This core is built against v0.7; the enum exists so the account value
/// can carry its entry point version without widening the contract here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum EntryPointVersion {
    /// Entry point release 0.7.0.
    #[strum(serialize = "0.7.0")]
    #[serde(rename = "0.7.0")]
    V0_7,
}

/// A versioned reference to the entry point contract.
///
/// Treated as an opaque external constant: this core never calls the entry
/// point except through the execution layer's counterfactual-address probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPointDef {
    /// Protocol version of the entry point.
    pub version: EntryPointVersion,
    /// Where the entry point lives on chain.
    pub address: Address,
}

impl EntryPointDef {
    /// The canonical v0.7 entry point, shared across chains.
    pub const V0_7: Self = Self {
        version: EntryPointVersion::V0_7,
        address: address!("0x0000000071727de22e5e9d8baf0edac6f37da032"),
    };
}

impl Default for EntryPointDef {
    fn default() -> Self {
        Self::V0_7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_point_version_display() {
        assert_eq!(EntryPointVersion::V0_7.to_string(), "0.7.0");
    }

    #[test]
    fn test_default_is_v0_7() {
        let def = EntryPointDef::default();
        assert_eq!(def, EntryPointDef::V0_7);
        assert!(!def.address.is_zero());
    }
}
