//! Account derivation core for Modular Account v2.
//!
//! Given a signing key or a passkey credential and a chosen account mode,
//! this crate deterministically computes the counterfactual address an
//! ERC-4337 modular account will occupy and the init code a bundler must
//! submit to deploy it — off-chain, before any transaction exists.
//!
//! Three account modes are supported: `default` (a semi-modular bytecode
//! account deployed through the factory), `7702` (an EIP-7702 upgraded EOA
//! that needs no deployment), and `webauthn` (a passkey-owned account).
//! See [`create_modular_account_v2`], [`create_webauthn_modular_account_v2`]
//! and the wire-level [`create_account_from_raw`].

mod account;
pub use account::*;

mod client;
pub use client::*;

mod credential;
pub use credential::*;

pub mod defaults;

mod entry_point;
pub use entry_point::*;

mod error;
pub use error::*;

mod factory;
pub use factory::*;

mod init_code;
pub use init_code::*;

pub mod logger;

mod mode;
pub use mode::*;

mod params;
pub use params::*;

mod predict;
pub use predict::*;

mod resolver;
pub use resolver::*;

mod signer;
pub use signer::*;
