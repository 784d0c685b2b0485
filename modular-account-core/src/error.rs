use thiserror::Error;

use crate::mode::AccountMode;

/// Error outputs from the account derivation core.
///
/// Precondition errors (`SignerRequired`, `CredentialRequired`) and the
/// privilege-consistency error (`EntityIdOverride`) are raised before any
/// network work happens. Transient execution-layer failures surface as
/// `Network`/`Rpc` without being retried here; retry policy belongs to the
/// caller.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The requested account mode derives its identity from a signer, but no
    /// signer was provided.
    #[error("signer_required: account mode `{mode}` requires a signer")]
    SignerRequired {
        /// The mode that was being resolved.
        mode: AccountMode,
    },
    /// Webauthn accounts derive their identity from a passkey credential,
    /// but no credential was provided.
    #[error("credential_required: webauthn accounts require a passkey credential")]
    CredentialRequired,
    /// An explicit account address that differs from the signer address was
    /// combined with the owner entity id. Honoring it would hand the owner
    /// validator slot to a non-owning signer.
    #[error(
        "entity_id_override: an account address override that differs from the signer cannot use the owner entity id"
    )]
    EntityIdOverride,
    /// The account mode tag is outside the known set. Statically constructed
    /// modes cannot hit this; it guards values parsed at runtime.
    #[error("invalid_mode: `{mode}` is not a recognized account mode")]
    InvalidMode {
        /// The unrecognized tag as received.
        mode: String,
    },
    /// The passkey credential's public key could not be parsed into an EC
    /// point.
    #[error("invalid_public_key: {reason}")]
    InvalidPublicKey {
        /// Why parsing failed.
        reason: String,
    },
    /// The presented input is not valid for the requested operation.
    #[error("invalid_input: {attribute}: {reason}")]
    InvalidInput {
        /// Which input was rejected.
        attribute: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// An account needs a signer or a passkey credential; neither was
    /// present on the final parameters.
    #[error("missing_identity: an account requires either a signer or a passkey credential")]
    MissingIdentity,
    /// Network connection error with details.
    #[error("network_error: {url}: {error}")]
    Network {
        /// The URL the request targeted.
        url: String,
        /// HTTP status code, when one was received.
        status: Option<u16>,
        /// Underlying error detail.
        error: String,
    },
    /// The execution layer answered with a JSON-RPC error that did not carry
    /// usable revert data.
    #[error("rpc_error: code {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// The counterfactual-address probe produced an answer this core could
    /// not interpret.
    #[error("counterfactual_resolution: {reason}")]
    CounterfactualResolution {
        /// What went wrong while interpreting the response.
        reason: String,
    },
    /// Unexpected error serializing or deserializing information.
    #[error("serialization_error: {error}")]
    Serialization {
        /// Underlying serialization error detail.
        error: String,
    },
    /// HTTP request failure.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}
