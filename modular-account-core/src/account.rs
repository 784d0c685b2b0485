use std::ops::Deref;
use std::sync::OnceLock;

use alloy_primitives::{Address, Bytes, U256};

use crate::client::ExecutionLayer;
use crate::credential::WebauthnCredential;
use crate::entry_point::EntryPointDef;
use crate::error::AccountError;
use crate::init_code::InitCode;
use crate::params::RawCreationParams;
use crate::resolver::{self, AccountDescriptor};
use crate::signer::{SignerEntity, SmartAccountSigner, StaticSigner};

/// The shared plumbing of a finished account value: the resolved
/// descriptor merged with chain, entry point, entity, and deferred-action
/// state.
///
/// Immutable after construction. Downstream signing and batching layers
/// read [`address`](Self::address) and [`init_code`](Self::init_code)
/// exclusively; they must never re-derive either.
#[derive(Debug)]
pub struct ModularAccountBase {
    chain_id: u64,
    entry_point: EntryPointDef,
    signer_entity: SignerEntity,
    deferred_action: Option<Bytes>,
    descriptor: AccountDescriptor,
    init_code_cache: OnceLock<Bytes>,
}

impl ModularAccountBase {
    fn new(
        chain_id: u64,
        entry_point: EntryPointDef,
        signer_entity: SignerEntity,
        deferred_action: Option<Bytes>,
        descriptor: AccountDescriptor,
    ) -> Self {
        Self {
            chain_id,
            entry_point,
            signer_entity,
            deferred_action,
            descriptor,
            init_code_cache: OnceLock::new(),
        }
    }

    /// The account's on-chain address, counterfactual until deployed.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.descriptor.address
    }

    /// The deployment payload, assembled once on first use.
    ///
    /// Idempotent: every call returns the same bytes. Empty for accounts
    /// that need no deployment.
    #[must_use]
    pub fn init_code(&self) -> &Bytes {
        self.init_code_cache
            .get_or_init(|| self.descriptor.init_code.compute())
    }

    /// The recipe behind [`init_code`](Self::init_code).
    #[must_use]
    pub const fn init_code_recipe(&self) -> &InitCode {
        &self.descriptor.init_code
    }

    /// The implementation the account delegates to, where the variant pins
    /// one.
    #[must_use]
    pub const fn implementation_address(&self) -> Option<Address> {
        self.descriptor.implementation
    }

    /// The chain the account lives on.
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The entry point the account operates against.
    #[must_use]
    pub const fn entry_point(&self) -> &EntryPointDef {
        &self.entry_point
    }

    /// The validation entity the account's identity occupies.
    #[must_use]
    pub const fn signer_entity(&self) -> SignerEntity {
        self.signer_entity
    }

    /// Encoded payload executed at deployment/first use, if any.
    #[must_use]
    pub const fn deferred_action(&self) -> Option<&Bytes> {
        self.deferred_action.as_ref()
    }
}

/// A signer-bound Modular Account v2.
#[derive(Debug)]
pub struct ModularAccountV2<S: SmartAccountSigner> {
    base: ModularAccountBase,
    signer: S,
}

impl<S: SmartAccountSigner> ModularAccountV2<S> {
    /// The signer owning (or delegated into) the account.
    #[must_use]
    pub const fn signer(&self) -> &S {
        &self.signer
    }
}

impl<S: SmartAccountSigner> Deref for ModularAccountV2<S> {
    type Target = ModularAccountBase;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// A passkey-bound Modular Account v2.
#[derive(Debug)]
pub struct WebauthnModularAccountV2 {
    base: ModularAccountBase,
    credential: WebauthnCredential,
}

impl WebauthnModularAccountV2 {
    /// The WebAuthn credential acting as the account's validator key.
    #[must_use]
    pub const fn credential(&self) -> &WebauthnCredential {
        &self.credential
    }
}

impl Deref for WebauthnModularAccountV2 {
    type Target = ModularAccountBase;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// Mode-specific knobs for [`CreateModularAccountV2Params`] when deploying
/// through the factory.
#[derive(Debug, Clone, Default)]
pub struct DefaultModeParams {
    /// Deployment salt; defaults to zero.
    pub salt: Option<U256>,
    /// Factory override.
    pub factory_address: Option<Address>,
    /// Implementation override.
    pub implementation_address: Option<Address>,
    /// Explicit init code, bypassing the factory-call recipe.
    pub init_code: Option<Bytes>,
}

/// Which signer-bound variant to create.
#[derive(Debug, Clone)]
pub enum SignerAccountMode {
    /// Semi-modular bytecode account deployed through the factory.
    Default(DefaultModeParams),
    /// EIP-7702 upgraded EOA; the account already exists at the signer's
    /// address.
    Eip7702,
}

impl Default for SignerAccountMode {
    fn default() -> Self {
        Self::Default(DefaultModeParams::default())
    }
}

/// Parameters for [`create_modular_account_v2`].
#[derive(Debug, Clone)]
pub struct CreateModularAccountV2Params<S> {
    /// The chain the account lives on.
    pub chain_id: u64,
    /// The signer the account is bound to.
    pub signer: S,
    /// Which variant to create, with its mode-specific knobs.
    pub mode: SignerAccountMode,
    /// Explicit account address, bypassing address derivation. Not
    /// validated against the factory/salt/owner combination.
    pub account_address: Option<Address>,
    /// Entry point override; defaults to the canonical v0.7 entry point.
    pub entry_point: Option<EntryPointDef>,
    /// Validation entity override; defaults to the global owner entity.
    pub signer_entity: Option<SignerEntity>,
    /// Encoded payload executed at deployment/first use.
    pub deferred_action: Option<Bytes>,
}

impl<S> CreateModularAccountV2Params<S> {
    /// Parameters for a default-mode account with everything else
    /// defaulted.
    pub fn new(chain_id: u64, signer: S) -> Self {
        Self {
            chain_id,
            signer,
            mode: SignerAccountMode::default(),
            account_address: None,
            entry_point: None,
            signer_entity: None,
            deferred_action: None,
        }
    }
}

/// Parameters for [`create_webauthn_modular_account_v2`].
#[derive(Debug, Clone)]
pub struct CreateWebauthnModularAccountV2Params {
    /// The chain the account lives on.
    pub chain_id: u64,
    /// The passkey credential the account is bound to.
    pub credential: WebauthnCredential,
    /// Deployment salt; defaults to zero.
    pub salt: Option<U256>,
    /// Factory override.
    pub factory_address: Option<Address>,
    /// Explicit init code, bypassing the factory-call recipe.
    pub init_code: Option<Bytes>,
    /// Explicit account address, bypassing the counterfactual query.
    pub account_address: Option<Address>,
    /// Entry point override; defaults to the canonical v0.7 entry point.
    pub entry_point: Option<EntryPointDef>,
    /// Validation entity override; defaults to the global owner entity.
    pub signer_entity: Option<SignerEntity>,
    /// Encoded payload executed at deployment/first use.
    pub deferred_action: Option<Bytes>,
}

impl CreateWebauthnModularAccountV2Params {
    /// Parameters for a webauthn account with everything else defaulted.
    pub fn new(chain_id: u64, credential: WebauthnCredential) -> Self {
        Self {
            chain_id,
            credential,
            salt: None,
            factory_address: None,
            init_code: None,
            account_address: None,
            entry_point: None,
            signer_entity: None,
            deferred_action: None,
        }
    }
}

/// Creates a signer-bound Modular Account v2.
///
/// Pure: default-mode addresses are predicted locally and 7702 accounts
/// live at the signer's own address, so no network access happens here.
///
/// # Errors
/// Returns [`AccountError::EntityIdOverride`] when a 7702 address override
/// conflicts with the owner entity id.
pub fn create_modular_account_v2<S: SmartAccountSigner>(
    params: CreateModularAccountV2Params<S>,
) -> Result<ModularAccountV2<S>, AccountError> {
    let signer_entity = params.signer_entity.unwrap_or_default();
    let entry_point = params.entry_point.unwrap_or_default();
    let signer_address = params.signer.address();

    let descriptor = match params.mode {
        SignerAccountMode::Default(mode_params) => resolver::resolve_default(
            signer_address,
            mode_params.salt,
            mode_params.factory_address,
            mode_params.implementation_address,
            mode_params.init_code,
            params.account_address,
        ),
        SignerAccountMode::Eip7702 => resolver::resolve_eip7702(
            signer_address,
            params.account_address,
            signer_entity.entity_id,
        )?,
    };

    Ok(ModularAccountV2 {
        base: ModularAccountBase::new(
            params.chain_id,
            entry_point,
            signer_entity,
            params.deferred_action,
            descriptor,
        ),
        signer: params.signer,
    })
}

/// Creates a passkey-bound Modular Account v2.
///
/// The credential's public key is parsed before anything else; unless an
/// explicit account address is supplied, the execution layer is then asked
/// once for the counterfactual address.
///
/// # Errors
/// Returns [`AccountError::InvalidPublicKey`] before any I/O when the
/// credential does not parse, or the execution layer's error unchanged.
pub async fn create_webauthn_modular_account_v2<E>(
    params: CreateWebauthnModularAccountV2Params,
    execution: &E,
) -> Result<WebauthnModularAccountV2, AccountError>
where
    E: ExecutionLayer + ?Sized,
{
    let signer_entity = params.signer_entity.unwrap_or_default();
    let entry_point = params.entry_point.unwrap_or_default();
    let key = params.credential.parse_public_key()?;

    let descriptor = resolver::resolve_webauthn(
        key,
        params.salt,
        params.factory_address,
        params.init_code,
        params.account_address,
        signer_entity.entity_id,
        &entry_point,
        execution,
    )
    .await?;

    Ok(WebauthnModularAccountV2 {
        base: ModularAccountBase::new(
            params.chain_id,
            entry_point,
            signer_entity,
            params.deferred_action,
            descriptor,
        ),
        credential: params.credential,
    })
}

/// A finished account of either identity, as produced from wire-level
/// parameters.
#[derive(Debug)]
pub enum AnyModularAccountV2 {
    /// Signer-bound account.
    Signer(ModularAccountV2<StaticSigner>),
    /// Passkey-bound account.
    Webauthn(WebauthnModularAccountV2),
}

impl AnyModularAccountV2 {
    /// The shared account plumbing, regardless of identity.
    #[must_use]
    pub const fn base(&self) -> &ModularAccountBase {
        match self {
            Self::Signer(account) => &account.base,
            Self::Webauthn(account) => &account.base,
        }
    }
}

/// Creates an account from wire-level parameters.
///
/// Normalization checks every precondition first (signer, credential, mode
/// tag), so a malformed payload fails before the execution layer is ever
/// touched. The identity invariant is re-checked at assembly: an account is
/// never produced with neither a signer nor a credential.
///
/// # Errors
/// Any normalization error, resolution error, or
/// [`AccountError::MissingIdentity`].
pub async fn create_account_from_raw<E>(
    params: RawCreationParams,
    execution: &E,
) -> Result<AnyModularAccountV2, AccountError>
where
    E: ExecutionLayer + ?Sized,
{
    let normalized = params.normalize()?;

    let descriptor =
        resolver::resolve(normalized.request, &normalized.entry_point, execution).await?;

    let base = ModularAccountBase::new(
        normalized.chain_id,
        normalized.entry_point,
        normalized.signer_entity,
        normalized.deferred_action,
        descriptor,
    );

    match (normalized.signer, normalized.credential) {
        (Some(signer), _) => Ok(AnyModularAccountV2::Signer(ModularAccountV2 {
            base,
            signer: StaticSigner(signer),
        })),
        (None, Some(credential)) => Ok(AnyModularAccountV2::Webauthn(WebauthnModularAccountV2 {
            base,
            credential,
        })),
        (None, None) => Err(AccountError::MissingIdentity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{
        DEFAULT_FACTORY, DEFAULT_SEMI_MODULAR_IMPLEMENTATION, EIP7702_IMPLEMENTATION,
    };
    use crate::predict::{predict_modular_account_v2_address, AccountVariant};
    use alloy_primitives::address;

    fn signer() -> StaticSigner {
        StaticSigner(address!("0xb64a1F443C9a18Cd3865C3c9Be871946617C0d75"))
    }

    #[test]
    fn test_default_account_matches_prediction() {
        let account =
            create_modular_account_v2(CreateModularAccountV2Params::new(8453, signer())).unwrap();

        let expected = predict_modular_account_v2_address(
            DEFAULT_FACTORY,
            DEFAULT_SEMI_MODULAR_IMPLEMENTATION,
            U256::ZERO,
            AccountVariant::SemiModular,
            signer().0,
        );
        assert_eq!(account.address(), expected);
        assert_eq!(account.chain_id(), 8453);
        assert_eq!(account.entry_point(), &EntryPointDef::V0_7);
        assert_eq!(account.signer(), &signer());
    }

    #[test]
    fn test_init_code_is_lazy_and_idempotent() {
        let account =
            create_modular_account_v2(CreateModularAccountV2Params::new(1, signer())).unwrap();

        let first = account.init_code().clone();
        let second = account.init_code().clone();
        assert_eq!(first, second);
        assert_eq!(first, account.init_code_recipe().compute());
        assert_eq!(&first[..20], DEFAULT_FACTORY.as_slice());
    }

    #[test]
    fn test_eip7702_account_lives_at_signer() {
        let params = CreateModularAccountV2Params {
            mode: SignerAccountMode::Eip7702,
            ..CreateModularAccountV2Params::new(1, signer())
        };
        let account = create_modular_account_v2(params).unwrap();

        assert_eq!(account.address(), signer().0);
        assert!(account.init_code().is_empty());
        assert_eq!(
            account.implementation_address(),
            Some(EIP7702_IMPLEMENTATION)
        );
    }

    #[test]
    fn test_eip7702_rejects_foreign_override_on_owner_entity() {
        let params = CreateModularAccountV2Params {
            mode: SignerAccountMode::Eip7702,
            account_address: Some(address!("0x69007702764179f14f51cdce752f4f775d74e139")),
            ..CreateModularAccountV2Params::new(1, signer())
        };
        assert!(matches!(
            create_modular_account_v2(params),
            Err(AccountError::EntityIdOverride)
        ));
    }

    #[test]
    fn test_eip7702_override_allowed_for_delegated_entity() {
        let delegate_target = address!("0x69007702764179f14f51cdce752f4f775d74e139");
        let params = CreateModularAccountV2Params {
            mode: SignerAccountMode::Eip7702,
            account_address: Some(delegate_target),
            signer_entity: Some(SignerEntity::new(7)),
            ..CreateModularAccountV2Params::new(1, signer())
        };
        let account = create_modular_account_v2(params).unwrap();
        assert_eq!(account.address(), delegate_target);
        assert_eq!(account.signer_entity().entity_id, 7);
    }

    #[test]
    fn test_salted_accounts_are_distinct() {
        let make = |salt: u64| {
            let params = CreateModularAccountV2Params {
                mode: SignerAccountMode::Default(DefaultModeParams {
                    salt: Some(U256::from(salt)),
                    ..DefaultModeParams::default()
                }),
                ..CreateModularAccountV2Params::new(1, signer())
            };
            create_modular_account_v2(params).unwrap().address()
        };
        assert_ne!(make(0), make(1));
        assert_eq!(make(4), make(4));
    }
}
