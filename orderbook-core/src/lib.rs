//! Core types for the order book trading client
//!
//! This crate defines the shared data structures used by the signer and the
//! REST client: tokens and the token registry, trade intents, API response
//! shapes, and the validation errors raised before any signing happens.

pub mod error;
pub mod market;
pub mod order;
pub mod registry;
pub mod serde_util;
pub mod token;

pub use error::{OrderError, OrderResult, TokenLeg};
pub use market::{
    CancelOrderResponse, CreateOrderResponse, DepthLevel, MarketDepth, MarketDepthData,
    OrderResponse, OrdersForUserResponse, Paginated, SupportedTokensResponse, SymbolInfo,
};
pub use order::{parse_symbol, Side, TradeIntent};
pub use registry::TokenRegistry;
pub use token::Token;
