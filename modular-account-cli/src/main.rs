//! Developer CLI for Modular Account v2.
//!
//! Predicts account addresses and assembles init code without touching the
//! network; the `webauthn-address` subcommand is the one exception, asking
//! a node RPC for the counterfactual address of a passkey account.

use alloy_primitives::{Address, U256};
use clap::{Parser, Subcommand};
use modular_account_core::{
    create_webauthn_modular_account_v2, defaults, predict_modular_account_v2_address,
    AccountVariant, CreateWebauthnModularAccountV2Params, InitCode, RpcExecutionLayer,
    SignerEntity, WebauthnCredential,
};

#[derive(Parser)]
#[command(name = "mav2", version, about = "Modular Account v2 derivation tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the address of a signer-owned account.
    Address {
        /// The owning signer's address.
        #[arg(long)]
        owner: Address,
        /// Deployment salt.
        #[arg(long, default_value = "0")]
        salt: U256,
        /// Factory override.
        #[arg(long)]
        factory: Option<Address>,
        /// Implementation override.
        #[arg(long)]
        implementation: Option<Address>,
        /// Predict the fully-modular variant instead of semi-modular.
        #[arg(long)]
        modular: bool,
        /// Emit JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Print the init code of a signer-owned account.
    InitCode {
        /// The owning signer's address.
        #[arg(long)]
        owner: Address,
        /// Deployment salt.
        #[arg(long, default_value = "0")]
        salt: U256,
        /// Factory override.
        #[arg(long)]
        factory: Option<Address>,
    },
    /// Print the init code of a passkey-owned account.
    WebauthnInitCode {
        /// Public key material: 0x-hex or base64url (SEC1, raw, or COSE).
        #[arg(long)]
        public_key: String,
        /// Deployment salt.
        #[arg(long, default_value = "0")]
        salt: U256,
        /// Validation entity id.
        #[arg(long, default_value = "0")]
        entity_id: u32,
        /// Factory override.
        #[arg(long)]
        factory: Option<Address>,
    },
    /// Resolve a passkey account's counterfactual address via a node RPC.
    WebauthnAddress {
        /// The node RPC endpoint.
        #[arg(long, env = "RPC_URL")]
        rpc_url: String,
        /// The chain id the account lives on.
        #[arg(long, default_value = "1")]
        chain_id: u64,
        /// Public key material: 0x-hex or base64url (SEC1, raw, or COSE).
        #[arg(long)]
        public_key: String,
        /// Deployment salt.
        #[arg(long, default_value = "0")]
        salt: U256,
        /// Validation entity id.
        #[arg(long, default_value = "0")]
        entity_id: u32,
        /// Factory override.
        #[arg(long)]
        factory: Option<Address>,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    modular_account_core::logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Address {
            owner,
            salt,
            factory,
            implementation,
            modular,
            json,
        } => print_address(owner, salt, factory, implementation, modular, json),
        Command::InitCode {
            owner,
            salt,
            factory,
        } => print_init_code(owner, salt, factory),
        Command::WebauthnInitCode {
            public_key,
            salt,
            entity_id,
            factory,
        } => print_webauthn_init_code(&public_key, salt, entity_id, factory)?,
        Command::WebauthnAddress {
            rpc_url,
            chain_id,
            public_key,
            salt,
            entity_id,
            factory,
        } => {
            resolve_webauthn_address(&rpc_url, chain_id, &public_key, salt, entity_id, factory)
                .await?;
        }
    }

    Ok(())
}

fn print_address(
    owner: Address,
    salt: U256,
    factory: Option<Address>,
    implementation: Option<Address>,
    modular: bool,
    json: bool,
) {
    let variant = if modular {
        AccountVariant::Modular
    } else {
        AccountVariant::SemiModular
    };
    let address = predict_modular_account_v2_address(
        factory.unwrap_or(defaults::DEFAULT_FACTORY),
        implementation.unwrap_or(defaults::DEFAULT_SEMI_MODULAR_IMPLEMENTATION),
        salt,
        variant,
        owner,
    );
    if json {
        println!("{}", serde_json::json!({ "address": address }));
    } else {
        println!("{address}");
    }
}

fn print_init_code(owner: Address, salt: U256, factory: Option<Address>) {
    let recipe = InitCode::SemiModular {
        factory: factory.unwrap_or(defaults::DEFAULT_FACTORY),
        owner,
        salt,
    };
    println!("0x{}", hex::encode(recipe.compute()));
}

fn print_webauthn_init_code(
    public_key: &str,
    salt: U256,
    entity_id: u32,
    factory: Option<Address>,
) -> eyre::Result<()> {
    let credential = WebauthnCredential::from_wire("cli", public_key)?;
    let recipe = InitCode::Webauthn {
        factory: factory.unwrap_or(defaults::DEFAULT_WEBAUTHN_FACTORY),
        key: credential.parse_public_key()?,
        salt,
        entity_id,
    };
    println!("0x{}", hex::encode(recipe.compute()));
    Ok(())
}

async fn resolve_webauthn_address(
    rpc_url: &str,
    chain_id: u64,
    public_key: &str,
    salt: U256,
    entity_id: u32,
    factory: Option<Address>,
) -> eyre::Result<()> {
    tracing::debug!(%rpc_url, "resolving counterfactual address");
    let credential = WebauthnCredential::from_wire("cli", public_key)?;
    let params = CreateWebauthnModularAccountV2Params {
        salt: Some(salt),
        factory_address: factory,
        signer_entity: Some(SignerEntity::new(entity_id)),
        ..CreateWebauthnModularAccountV2Params::new(chain_id, credential)
    };

    let execution = RpcExecutionLayer::new(rpc_url);
    let account = create_webauthn_modular_account_v2(params, &execution).await?;
    println!("{}", account.address());
    Ok(())
}
