//! Order Book Trading - order signing and REST client
//!
//! This crate provides:
//! - Decimal to base-unit conversion for token amounts
//! - EIP-712 permit-witness order messages (Permit2 and RePermit)
//! - Wallet loading and typed-data signing
//! - Order message construction from a trade intent
//! - An authenticated client for the order book REST API

pub mod client;
pub mod config;
pub mod eip712;
pub mod order;
pub mod types;
pub mod units;
pub mod wallet;

pub use client::OrderBookClient;
pub use config::{ClientConfig, DeploymentConfig, PermitScheme};
pub use eip712::{Eip712Message, recover_signer};
pub use order::{OrderSigner, ResolvedTokenPair, resolve_token_pair};
pub use types::*;
pub use units::{MAX_PRICE_DECIMALS, to_base_units};
pub use wallet::OrderWallet;

pub use orderbook_core::{OrderError, Side, Token, TokenRegistry, TradeIntent};
