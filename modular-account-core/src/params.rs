use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::credential::WebauthnCredential;
use crate::defaults::DEFAULT_OWNER_ENTITY_ID;
use crate::entry_point::EntryPointDef;
use crate::error::AccountError;
use crate::mode::AccountMode;
use crate::resolver::CreationRequest;
use crate::signer::SignerEntity;

/// Wire-level account creation parameters.
///
/// Everything is optional here so a JSON payload (a config file, an RPC
/// body, a CLI flag set) can round-trip losslessly; [`normalize`] is the
/// single place where mode inference, defaults, and preconditions are
/// applied. Code past normalization never sees an unresolved mode.
///
/// [`normalize`]: Self::normalize
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCreationParams {
    /// Mode tag: `default`, `7702`, or `webauthn`. Absent means `default`.
    pub mode: Option<String>,
    /// The chain the account lives on.
    pub chain_id: u64,
    /// The signer's address, for signer-bound modes.
    pub signer: Option<Address>,
    /// The passkey credential, for webauthn mode.
    pub credential: Option<RawCredential>,
    /// Deployment salt; defaults to zero.
    pub salt: Option<U256>,
    /// Factory override.
    pub factory_address: Option<Address>,
    /// Implementation override (default mode only).
    pub implementation_address: Option<Address>,
    /// Explicit init code, bypassing the factory-call recipe.
    pub init_code: Option<Bytes>,
    /// Explicit account address, bypassing address derivation. Not
    /// validated against the factory/salt/owner combination.
    pub account_address: Option<Address>,
    /// Validation entity id override.
    pub entity_id: Option<u32>,
    /// Whether the entity validates globally; defaults to true.
    pub is_global_validation: Option<bool>,
    /// Entry point override; defaults to the canonical v0.7 entry point.
    pub entry_point: Option<EntryPointDef>,
    /// Encoded payload executed at deployment/first use.
    pub deferred_action: Option<Bytes>,
}

/// A credential as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCredential {
    /// The credential id, base64url.
    pub id: String,
    /// Public key material: `0x`-prefixed hex or base64url.
    pub public_key: String,
}

/// The outcome of normalizing [`RawCreationParams`]: a typed creation
/// request plus the shared fields descriptor assembly needs.
#[derive(Debug, Clone)]
pub struct NormalizedCreation {
    /// The fully-resolved mode tag.
    pub mode: AccountMode,
    /// The typed, mode-specific request for the resolver.
    pub request: CreationRequest,
    /// The chain the account lives on.
    pub chain_id: u64,
    /// The entry point the account operates against.
    pub entry_point: EntryPointDef,
    /// The validation entity the identity occupies.
    pub signer_entity: SignerEntity,
    /// Encoded payload executed at deployment/first use.
    pub deferred_action: Option<Bytes>,
    /// The signer address, when a signer-bound mode was requested.
    pub signer: Option<Address>,
    /// The parsed credential, when webauthn mode was requested.
    pub credential: Option<WebauthnCredential>,
}

impl RawCreationParams {
    /// Normalizes the wire parameters into a typed creation request,
    /// checking every mode precondition before any I/O can happen.
    ///
    /// # Errors
    /// - [`AccountError::InvalidMode`] for a tag outside the known set.
    /// - [`AccountError::SignerRequired`] when `default`/`7702` has no
    ///   signer.
    /// - [`AccountError::CredentialRequired`] when `webauthn` has no
    ///   credential.
    /// - [`AccountError::InvalidPublicKey`] / [`AccountError::InvalidInput`]
    ///   when the credential's key material does not parse.
    pub fn normalize(self) -> Result<NormalizedCreation, AccountError> {
        let mode = AccountMode::normalize(self.mode.as_deref())?;

        let signer_entity = SignerEntity {
            is_global_validation: self.is_global_validation.unwrap_or(true),
            entity_id: self.entity_id.unwrap_or(DEFAULT_OWNER_ENTITY_ID),
        };
        let entry_point = self.entry_point.unwrap_or_default();

        let mut credential = None;
        let request = match mode {
            AccountMode::Default => {
                let owner = self.signer.ok_or(AccountError::SignerRequired { mode })?;
                CreationRequest::Default {
                    owner,
                    salt: self.salt,
                    factory: self.factory_address,
                    implementation: self.implementation_address,
                    init_code: self.init_code,
                    account_address: self.account_address,
                }
            }
            AccountMode::Eip7702 => {
                let signer = self.signer.ok_or(AccountError::SignerRequired { mode })?;
                CreationRequest::Eip7702 {
                    signer,
                    account_address: self.account_address,
                    entity_id: signer_entity.entity_id,
                }
            }
            AccountMode::Webauthn => {
                let raw = self.credential.ok_or(AccountError::CredentialRequired)?;
                let parsed = WebauthnCredential::from_wire(raw.id, &raw.public_key)?;
                let key = parsed.parse_public_key()?;
                credential = Some(parsed);
                CreationRequest::Webauthn {
                    key,
                    salt: self.salt,
                    factory: self.factory_address,
                    init_code: self.init_code,
                    account_address: self.account_address,
                    entity_id: signer_entity.entity_id,
                }
            }
        };

        Ok(NormalizedCreation {
            mode,
            request,
            chain_id: self.chain_id,
            entry_point,
            signer_entity,
            deferred_action: self.deferred_action,
            signer: self.signer,
            credential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn signer() -> Address {
        address!("0xb64a1F443C9a18Cd3865C3c9Be871946617C0d75")
    }

    fn sec1_key_hex() -> String {
        let mut sec1 = vec![0x04];
        sec1.extend_from_slice(&[0x11; 32]);
        sec1.extend_from_slice(&[0x22; 32]);
        format!("0x{}", hex::encode(sec1))
    }

    #[test]
    fn test_unset_mode_normalizes_to_default() {
        let normalized = RawCreationParams {
            signer: Some(signer()),
            chain_id: 1,
            ..Default::default()
        }
        .normalize()
        .unwrap();

        assert_eq!(normalized.mode, AccountMode::Default);
        assert_eq!(normalized.signer_entity, SignerEntity::default());
        assert_eq!(normalized.entry_point, EntryPointDef::V0_7);
        assert!(matches!(
            normalized.request,
            CreationRequest::Default { owner, .. } if owner == signer()
        ));
    }

    #[test]
    fn test_default_mode_without_signer_fails() {
        let err = RawCreationParams::default().normalize().unwrap_err();
        assert!(matches!(
            err,
            AccountError::SignerRequired {
                mode: AccountMode::Default
            }
        ));
    }

    #[test]
    fn test_7702_without_signer_fails_with_mode_tag() {
        let err = RawCreationParams {
            mode: Some("7702".to_string()),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(
            err,
            AccountError::SignerRequired {
                mode: AccountMode::Eip7702
            }
        ));
    }

    #[test]
    fn test_webauthn_without_credential_fails() {
        let err = RawCreationParams {
            mode: Some("webauthn".to_string()),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(err, AccountError::CredentialRequired));
    }

    #[test]
    fn test_webauthn_with_credential_parses_key() {
        let normalized = RawCreationParams {
            mode: Some("webauthn".to_string()),
            chain_id: 1,
            credential: Some(RawCredential {
                id: "cred-1".to_string(),
                public_key: sec1_key_hex(),
            }),
            ..Default::default()
        }
        .normalize()
        .unwrap();

        assert!(normalized.credential.is_some());
        match normalized.request {
            CreationRequest::Webauthn { key, .. } => {
                assert_eq!(key.x, U256::from_be_slice(&[0x11; 32]));
                assert_eq!(key.y, U256::from_be_slice(&[0x22; 32]));
            }
            other => panic!("expected webauthn request, got: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected_before_anything_else() {
        // Even a payload that is broken in other ways fails on the mode tag
        // first; nothing silently falls through to default behavior.
        let err = RawCreationParams {
            mode: Some("passkey".to_string()),
            ..Default::default()
        }
        .normalize()
        .unwrap_err();
        assert!(matches!(err, AccountError::InvalidMode { .. }));
    }

    #[test]
    fn test_entity_override_reaches_request() {
        let normalized = RawCreationParams {
            mode: Some("7702".to_string()),
            signer: Some(signer()),
            entity_id: Some(5),
            is_global_validation: Some(false),
            ..Default::default()
        }
        .normalize()
        .unwrap();

        assert_eq!(normalized.signer_entity.entity_id, 5);
        assert!(!normalized.signer_entity.is_global_validation);
        assert!(matches!(
            normalized.request,
            CreationRequest::Eip7702 { entity_id: 5, .. }
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let json = format!(
            r#"{{
                "mode": "webauthn",
                "chainId": 8453,
                "credential": {{ "id": "cred-1", "publicKey": "{}" }},
                "salt": "0x2a"
            }}"#,
            sec1_key_hex()
        );

        let params: RawCreationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params.chain_id, 8453);
        assert_eq!(params.salt, Some(U256::from(42)));

        let normalized = params.normalize().unwrap();
        assert_eq!(normalized.mode, AccountMode::Webauthn);
    }
}
