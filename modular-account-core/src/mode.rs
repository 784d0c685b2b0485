use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::AccountError;

/// The account variant a caller is asking for.
///
/// Each mode has its own preconditions, init-code recipe, and address
/// source; the resolver matches exhaustively over this enum, so adding a
/// variant without handling it everywhere is a compile-time error.
///
/// `Default` is a semi-modular account deployed through the factory.
/// `Eip7702` is an upgraded EOA (the account already exists at the signer's
/// own address and has no init code). `Webauthn` derives its identity from a
/// passkey credential instead of a signer.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountMode {
    /// Semi-modular bytecode account, deployed deterministically via the
    /// account factory.
    #[default]
    Default,
    /// EIP-7702 upgraded EOA. No deployment needed.
    #[strum(serialize = "7702")]
    #[serde(rename = "7702")]
    Eip7702,
    /// Passkey-owned account using a WebAuthn credential as its validator.
    Webauthn,
}

impl AccountMode {
    /// Parses a mode tag, failing with [`AccountError::InvalidMode`] for
    /// anything outside the known set.
    ///
    /// # Errors
    /// Returns `InvalidMode` if `tag` is not one of `default`, `7702`,
    /// `webauthn`.
    pub fn parse(tag: &str) -> Result<Self, AccountError> {
        Self::from_str(tag).map_err(|_| AccountError::InvalidMode {
            mode: tag.to_string(),
        })
    }

    /// Normalizes an optional wire-level tag into a concrete mode.
    ///
    /// An absent tag means `Default`; everything downstream operates on a
    /// fully-resolved mode and never re-checks for `None`.
    ///
    /// # Errors
    /// Returns `InvalidMode` for an unknown tag.
    pub fn normalize(tag: Option<&str>) -> Result<Self, AccountError> {
        tag.map_or(Ok(Self::Default), Self::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("default", AccountMode::Default; "default tag")]
    #[test_case("7702", AccountMode::Eip7702; "eip7702 tag")]
    #[test_case("webauthn", AccountMode::Webauthn; "webauthn tag")]
    fn test_mode_parsing(tag: &str, expected: AccountMode) {
        assert_eq!(AccountMode::parse(tag).unwrap(), expected);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = AccountMode::parse("5792").unwrap_err();
        match err {
            AccountError::InvalidMode { mode } => assert_eq!(mode, "5792"),
            other => panic!("expected InvalidMode, got: {other:?}"),
        }

        // An unknown tag must never fall through to default behavior.
        assert!(AccountMode::parse("Default").is_err());
        assert!(AccountMode::parse("").is_err());
    }

    #[test]
    fn test_unset_mode_normalizes_to_default() {
        assert_eq!(AccountMode::normalize(None).unwrap(), AccountMode::Default);
        assert_eq!(
            AccountMode::normalize(Some("7702")).unwrap(),
            AccountMode::Eip7702
        );
        assert!(AccountMode::normalize(Some("bogus")).is_err());
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [
            AccountMode::Default,
            AccountMode::Eip7702,
            AccountMode::Webauthn,
        ] {
            assert_eq!(AccountMode::parse(&mode.to_string()).unwrap(), mode);
        }
    }

    #[test]
    fn test_mode_serde() {
        assert_eq!(
            serde_json::to_string(&AccountMode::Eip7702).unwrap(),
            "\"7702\""
        );
        let mode: AccountMode = serde_json::from_str("\"webauthn\"").unwrap();
        assert_eq!(mode, AccountMode::Webauthn);
    }
}
