use alloy_primitives::{Bytes, U256};
use base64::Engine;
use ciborium::value::{Integer, Value};
use serde::{Deserialize, Serialize};

use crate::error::AccountError;

/// COSE key type for double-coordinate elliptic-curve keys.
const COSE_KTY_EC2: i64 = 2;
/// COSE curve identifier for P-256.
const COSE_CRV_P256: i64 = 1;

/// A WebAuthn credential as returned by an authenticator at registration.
///
/// The `public_key` bytes are kept verbatim; parsing into an EC point
/// happens on demand so a credential received over the wire can be stored
/// and round-tripped without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebauthnCredential {
    /// The credential id, base64url as delivered by the authenticator.
    pub id: String,
    /// The credential's public key: SEC1 uncompressed, raw `x ‖ y`, or a
    /// COSE EC2 CBOR map.
    pub public_key: Bytes,
}

impl WebauthnCredential {
    /// Builds a credential from an id and wire-format key material.
    ///
    /// Key material is accepted as `0x`-prefixed hex or base64url (the two
    /// encodings registration responses use in practice).
    ///
    /// # Errors
    /// Returns [`AccountError::InvalidInput`] if the key material is neither
    /// valid hex nor valid base64url.
    pub fn from_wire(id: impl Into<String>, public_key: &str) -> Result<Self, AccountError> {
        Ok(Self {
            id: id.into(),
            public_key: decode_key_material(public_key)?,
        })
    }

    /// Parses the credential's public key into its EC point.
    ///
    /// # Errors
    /// Returns [`AccountError::InvalidPublicKey`] if the bytes are not one
    /// of the supported encodings.
    pub fn parse_public_key(&self) -> Result<PublicKey, AccountError> {
        PublicKey::parse(&self.public_key)
    }
}

/// An affine P-256 public key point, the argument pair the webauthn factory
/// call takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    /// Affine x coordinate.
    pub x: U256,
    /// Affine y coordinate.
    pub y: U256,
}

impl PublicKey {
    /// Parses raw public key bytes in any of the encodings WebAuthn
    /// authenticators emit:
    ///
    /// - 65-byte SEC1 uncompressed (`0x04 ‖ x ‖ y`),
    /// - 64-byte raw `x ‖ y`,
    /// - a COSE EC2 key (CBOR map, the `getPublicKey()` attestation format).
    ///
    /// # Errors
    /// Returns [`AccountError::InvalidPublicKey`] for anything else,
    /// including SEC1 compressed points (authenticators never produce them
    /// and decompression is out of scope here).
    pub fn parse(bytes: &[u8]) -> Result<Self, AccountError> {
        match bytes {
            [0x04, rest @ ..] if rest.len() == 64 => Ok(Self::from_coordinates(rest)),
            _ if bytes.len() == 64 => Ok(Self::from_coordinates(bytes)),
            [0x02 | 0x03, ..] if bytes.len() == 33 => Err(AccountError::InvalidPublicKey {
                reason: "compressed SEC1 points are not supported".to_string(),
            }),
            _ => Self::parse_cose(bytes),
        }
    }

    fn from_coordinates(xy: &[u8]) -> Self {
        Self {
            x: U256::from_be_slice(&xy[..32]),
            y: U256::from_be_slice(&xy[32..]),
        }
    }

    /// Parses a COSE EC2 key map: label 1 is `kty`, -1 is `crv`, -2/-3 are
    /// the x/y coordinates as 32-byte strings.
    fn parse_cose(bytes: &[u8]) -> Result<Self, AccountError> {
        let value: Value =
            ciborium::de::from_reader(bytes).map_err(|err| AccountError::InvalidPublicKey {
                reason: format!("not SEC1, raw, or CBOR key material: {err}"),
            })?;

        let Value::Map(entries) = value else {
            return Err(AccountError::InvalidPublicKey {
                reason: "CBOR public key is not a COSE key map".to_string(),
            });
        };

        let mut x = None;
        let mut y = None;
        for (label, entry) in &entries {
            let Value::Integer(label) = label else {
                continue;
            };
            match (i64::try_from(*label), entry) {
                (Ok(1), Value::Integer(kty)) if *kty != Integer::from(COSE_KTY_EC2) => {
                    return Err(AccountError::InvalidPublicKey {
                        reason: "COSE key type is not EC2".to_string(),
                    });
                }
                (Ok(-1), Value::Integer(crv)) if *crv != Integer::from(COSE_CRV_P256) => {
                    return Err(AccountError::InvalidPublicKey {
                        reason: "COSE curve is not P-256".to_string(),
                    });
                }
                (Ok(-2), Value::Bytes(coord)) => x = Some(coordinate(coord)?),
                (Ok(-3), Value::Bytes(coord)) => y = Some(coordinate(coord)?),
                _ => {}
            }
        }

        match (x, y) {
            (Some(x), Some(y)) => Ok(Self { x, y }),
            _ => Err(AccountError::InvalidPublicKey {
                reason: "COSE key map is missing the x or y coordinate".to_string(),
            }),
        }
    }
}

fn coordinate(bytes: &[u8]) -> Result<U256, AccountError> {
    if bytes.len() == 32 {
        Ok(U256::from_be_slice(bytes))
    } else {
        Err(AccountError::InvalidPublicKey {
            reason: format!("coordinate is {} bytes, expected 32", bytes.len()),
        })
    }
}

/// Decodes wire-format key material: `0x`-prefixed hex or base64url.
///
/// # Errors
/// Returns [`AccountError::InvalidInput`] if the string is neither.
pub fn decode_key_material(material: &str) -> Result<Bytes, AccountError> {
    if let Some(stripped) = material.strip_prefix("0x") {
        return hex::decode(stripped)
            .map(Bytes::from)
            .map_err(|err| AccountError::InvalidInput {
                attribute: "public_key",
                reason: format!("invalid hex: {err}"),
            });
    }

    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(material)
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(material))
        .map(Bytes::from)
        .map_err(|err| AccountError::InvalidInput {
            attribute: "public_key",
            reason: format!("invalid base64url: {err}"),
        })
}
