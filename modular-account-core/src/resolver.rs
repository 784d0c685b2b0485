use alloy_primitives::{Address, Bytes, U256};

use crate::client::ExecutionLayer;
use crate::credential::PublicKey;
use crate::defaults::{
    DEFAULT_FACTORY, DEFAULT_OWNER_ENTITY_ID, DEFAULT_SEMI_MODULAR_IMPLEMENTATION,
    DEFAULT_WEBAUTHN_FACTORY, EIP7702_IMPLEMENTATION,
};
use crate::entry_point::EntryPointDef;
use crate::error::AccountError;
use crate::init_code::InitCode;
use crate::predict::{predict_modular_account_v2_address, AccountVariant};

/// What mode resolution produces: everything downstream layers need to
/// address the account and, if necessary, deploy it.
///
/// Produced fresh per resolution; holds no shared state.
#[derive(Debug, Clone)]
pub struct AccountDescriptor {
    /// The account's on-chain address (counterfactual until deployed).
    pub address: Address,
    /// The deployment payload recipe.
    pub init_code: InitCode,
    /// The implementation the account delegates to, where the variant pins
    /// one.
    pub implementation: Option<Address>,
}

/// A fully-normalized account creation request.
///
/// Every variant carries exactly the inputs its mode consumes; defaults for
/// absent fields are applied at resolution time. The resolver matches over
/// this exhaustively, so a new variant cannot be added without a handler.
#[derive(Debug, Clone)]
pub enum CreationRequest {
    /// Semi-modular bytecode account owned by a signer.
    Default {
        /// The owning signer's address.
        owner: Address,
        /// Deployment salt; defaults to zero.
        salt: Option<U256>,
        /// Factory override; defaults to the canonical factory.
        factory: Option<Address>,
        /// Implementation override; defaults to the canonical semi-modular
        /// implementation.
        implementation: Option<Address>,
        /// Explicit init code, bypassing the factory-call recipe.
        init_code: Option<Bytes>,
        /// Explicit account address, bypassing prediction. Not validated
        /// against the factory/salt/owner combination.
        account_address: Option<Address>,
    },
    /// EIP-7702 upgraded EOA.
    Eip7702 {
        /// The signer whose EOA carries the account.
        signer: Address,
        /// Explicit account address. Under the owner entity id this must
        /// equal the signer's address.
        account_address: Option<Address>,
        /// The validation entity id the signer occupies.
        entity_id: u32,
    },
    /// Passkey-owned account.
    Webauthn {
        /// The credential's parsed EC point.
        key: PublicKey,
        /// Deployment salt; defaults to zero.
        salt: Option<U256>,
        /// Factory override; defaults to the canonical webauthn factory.
        factory: Option<Address>,
        /// Explicit init code, bypassing the factory-call recipe.
        init_code: Option<Bytes>,
        /// Explicit account address, bypassing the counterfactual query.
        account_address: Option<Address>,
        /// The validation entity id the passkey occupies.
        entity_id: u32,
    },
}

/// Resolves a creation request into an account descriptor.
///
/// Only the webauthn arm without an explicit address touches the execution
/// layer, and only after every precondition has been checked; the other
/// arms are pure.
///
/// # Errors
/// Returns [`AccountError::EntityIdOverride`] for an inconsistent 7702
/// override, or the execution layer's error unchanged.
pub async fn resolve<E>(
    request: CreationRequest,
    entry_point: &EntryPointDef,
    execution: &E,
) -> Result<AccountDescriptor, AccountError>
where
    E: ExecutionLayer + ?Sized,
{
    match request {
        CreationRequest::Default {
            owner,
            salt,
            factory,
            implementation,
            init_code,
            account_address,
        } => Ok(resolve_default(
            owner,
            salt,
            factory,
            implementation,
            init_code,
            account_address,
        )),
        CreationRequest::Eip7702 {
            signer,
            account_address,
            entity_id,
        } => resolve_eip7702(signer, account_address, entity_id),
        CreationRequest::Webauthn {
            key,
            salt,
            factory,
            init_code,
            account_address,
            entity_id,
        } => {
            resolve_webauthn(
                key,
                salt,
                factory,
                init_code,
                account_address,
                entity_id,
                entry_point,
                execution,
            )
            .await
        }
    }
}

pub(crate) fn resolve_default(
    owner: Address,
    salt: Option<U256>,
    factory: Option<Address>,
    implementation: Option<Address>,
    init_code: Option<Bytes>,
    account_address: Option<Address>,
) -> AccountDescriptor {
    let salt = salt.unwrap_or(U256::ZERO);
    let factory = factory.unwrap_or(DEFAULT_FACTORY);
    let implementation = implementation.unwrap_or(DEFAULT_SEMI_MODULAR_IMPLEMENTATION);

    // An explicit address skips prediction but never the init-code recipe.
    let address = account_address.unwrap_or_else(|| {
        predict_modular_account_v2_address(
            factory,
            implementation,
            salt,
            AccountVariant::SemiModular,
            owner,
        )
    });

    let init_code = init_code.map_or(
        InitCode::SemiModular {
            factory,
            owner,
            salt,
        },
        InitCode::Explicit,
    );

    tracing::debug!(%address, %owner, %salt, "resolved default-mode account");

    AccountDescriptor {
        address,
        init_code,
        implementation: None,
    }
}

pub(crate) fn resolve_eip7702(
    signer: Address,
    account_address: Option<Address>,
    entity_id: u32,
) -> Result<AccountDescriptor, AccountError> {
    let address = account_address.unwrap_or(signer);

    // Under the owner entity id, an address override pointing anywhere but
    // the signer's own EOA would hand the owner slot to a non-owner.
    if entity_id == DEFAULT_OWNER_ENTITY_ID && address != signer {
        return Err(AccountError::EntityIdOverride);
    }

    tracing::debug!(%address, "resolved 7702-mode account");

    Ok(AccountDescriptor {
        address,
        init_code: InitCode::Deployed,
        implementation: Some(EIP7702_IMPLEMENTATION),
    })
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn resolve_webauthn<E>(
    key: PublicKey,
    salt: Option<U256>,
    factory: Option<Address>,
    init_code: Option<Bytes>,
    account_address: Option<Address>,
    entity_id: u32,
    entry_point: &EntryPointDef,
    execution: &E,
) -> Result<AccountDescriptor, AccountError>
where
    E: ExecutionLayer + ?Sized,
{
    let salt = salt.unwrap_or(U256::ZERO);
    let factory = factory.unwrap_or(DEFAULT_WEBAUTHN_FACTORY);

    let init_code = init_code.map_or(
        InitCode::Webauthn {
            factory,
            key,
            salt,
            entity_id,
        },
        InitCode::Explicit,
    );

    let address = match account_address {
        Some(address) => address,
        None => {
            execution
                .resolve_counterfactual_address(entry_point, &init_code)
                .await?
        }
    };

    tracing::debug!(%address, "resolved webauthn-mode account");

    Ok(AccountDescriptor {
        address,
        init_code,
        implementation: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExecution {
        answer: Address,
        calls: AtomicUsize,
    }

    impl CountingExecution {
        fn new(answer: Address) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExecutionLayer for CountingExecution {
        async fn resolve_counterfactual_address(
            &self,
            _entry_point: &EntryPointDef,
            _init_code: &InitCode,
        ) -> Result<Address, AccountError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer)
        }
    }

    fn signer() -> Address {
        address!("0xb64a1F443C9a18Cd3865C3c9Be871946617C0d75")
    }

    fn other_address() -> Address {
        address!("0x69007702764179f14f51cdce752f4f775d74e139")
    }

    fn key() -> PublicKey {
        PublicKey {
            x: U256::from(11),
            y: U256::from(22),
        }
    }

    #[tokio::test]
    async fn test_default_mode_predicts_without_io() {
        let execution = CountingExecution::new(Address::ZERO);
        let request = CreationRequest::Default {
            owner: signer(),
            salt: None,
            factory: None,
            implementation: None,
            init_code: None,
            account_address: None,
        };

        let descriptor = resolve(request, &EntryPointDef::V0_7, &execution)
            .await
            .unwrap();

        let expected = predict_modular_account_v2_address(
            DEFAULT_FACTORY,
            DEFAULT_SEMI_MODULAR_IMPLEMENTATION,
            U256::ZERO,
            AccountVariant::SemiModular,
            signer(),
        );
        assert_eq!(descriptor.address, expected);
        assert_eq!(descriptor.implementation, None);
        assert_eq!(execution.calls(), 0);
    }

    #[tokio::test]
    async fn test_address_override_keeps_init_code() {
        let execution = CountingExecution::new(Address::ZERO);

        let plain = resolve(
            CreationRequest::Default {
                owner: signer(),
                salt: Some(U256::from(3)),
                factory: None,
                implementation: None,
                init_code: None,
                account_address: None,
            },
            &EntryPointDef::V0_7,
            &execution,
        )
        .await
        .unwrap();

        // Feed the predicted address back as an explicit override.
        let overridden = resolve(
            CreationRequest::Default {
                owner: signer(),
                salt: Some(U256::from(3)),
                factory: None,
                implementation: None,
                init_code: None,
                account_address: Some(plain.address),
            },
            &EntryPointDef::V0_7,
            &execution,
        )
        .await
        .unwrap();

        assert_eq!(overridden.address, plain.address);
        assert_eq!(overridden.init_code.compute(), plain.init_code.compute());
    }

    #[test]
    fn test_eip7702_defaults_to_signer_address() {
        let descriptor = resolve_eip7702(signer(), None, DEFAULT_OWNER_ENTITY_ID).unwrap();
        assert_eq!(descriptor.address, signer());
        assert!(descriptor.init_code.is_deployed());
        assert_eq!(descriptor.implementation, Some(EIP7702_IMPLEMENTATION));
    }

    #[test]
    fn test_eip7702_owner_entity_rejects_foreign_override() {
        let err =
            resolve_eip7702(signer(), Some(other_address()), DEFAULT_OWNER_ENTITY_ID).unwrap_err();
        assert!(matches!(err, AccountError::EntityIdOverride));
    }

    #[test]
    fn test_eip7702_override_allowed_off_owner_entity() {
        // The same mismatch is fine for a delegated entity id.
        let descriptor = resolve_eip7702(signer(), Some(other_address()), 1).unwrap();
        assert_eq!(descriptor.address, other_address());
    }

    #[test]
    fn test_eip7702_matching_override_is_fine() {
        let descriptor =
            resolve_eip7702(signer(), Some(signer()), DEFAULT_OWNER_ENTITY_ID).unwrap();
        assert_eq!(descriptor.address, signer());
    }

    #[tokio::test]
    async fn test_webauthn_queries_execution_layer_once() {
        let execution = CountingExecution::new(other_address());
        let request = CreationRequest::Webauthn {
            key: key(),
            salt: None,
            factory: None,
            init_code: None,
            account_address: None,
            entity_id: DEFAULT_OWNER_ENTITY_ID,
        };

        let descriptor = resolve(request, &EntryPointDef::V0_7, &execution)
            .await
            .unwrap();

        assert_eq!(descriptor.address, other_address());
        assert_eq!(execution.calls(), 1);
    }

    #[tokio::test]
    async fn test_webauthn_explicit_address_skips_query() {
        let execution = CountingExecution::new(other_address());
        let request = CreationRequest::Webauthn {
            key: key(),
            salt: None,
            factory: None,
            init_code: None,
            account_address: Some(signer()),
            entity_id: DEFAULT_OWNER_ENTITY_ID,
        };

        let descriptor = resolve(request, &EntryPointDef::V0_7, &execution)
            .await
            .unwrap();

        assert_eq!(descriptor.address, signer());
        assert_eq!(execution.calls(), 0);

        // The init code recipe is still the factory call.
        match descriptor.init_code {
            InitCode::Webauthn { entity_id, .. } => assert_eq!(entity_id, 0),
            other => panic!("expected webauthn init code, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_webauthn_explicit_init_code_wins() {
        let execution = CountingExecution::new(other_address());
        let payload = Bytes::from(vec![0xaa, 0xbb]);
        let request = CreationRequest::Webauthn {
            key: key(),
            salt: None,
            factory: None,
            init_code: Some(payload.clone()),
            account_address: None,
            entity_id: DEFAULT_OWNER_ENTITY_ID,
        };

        let descriptor = resolve(request, &EntryPointDef::V0_7, &execution)
            .await
            .unwrap();
        assert_eq!(descriptor.init_code, InitCode::Explicit(payload));
    }
}
