//! Shared types for order book trading

use orderbook_core::{OrderError, TradeIntent};
use serde::{Deserialize, Serialize};

use crate::eip712::Eip712Message;

// ============================================================================
// Signed Orders
// ============================================================================

/// A signature together with the exact message it was produced from
///
/// The two only make sense as a pair: the API rebuilds the digest from
/// `message` to verify `signature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedOrder {
    /// 0x-prefixed 65-byte `r || s || v` ECDSA signature
    pub signature: String,
    pub message: Eip712Message,
}

// ============================================================================
// API Request Types
// ============================================================================

/// Body of `POST api/v1/order`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest<'a> {
    #[serde(flatten)]
    pub intent: &'a TradeIntent,
    pub eip712_sig: &'a str,
    pub eip712_msg_data: &'a Eip712Message,
}

impl<'a> CreateOrderRequest<'a> {
    pub fn new(intent: &'a TradeIntent, signed: &'a SignedOrder) -> Self {
        Self {
            intent,
            eip712_sig: &signed.signature,
            eip712_msg_data: &signed.message,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Trading errors
#[derive(Debug, thiserror::Error)]
pub enum TradingError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("HTTP Error {status}: {message}")]
    ApiRequestFailed { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TradingError {
    pub fn wallet(msg: impl Into<String>) -> Self {
        TradingError::Wallet(msg.into())
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        TradingError::Signing(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        TradingError::Config(msg.into())
    }

    /// Status code of a rejected API request, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            TradingError::Unauthorized => Some(401),
            TradingError::ApiRequestFailed { status, .. } => Some(*status),
            TradingError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this is an input error raised before any signing or I/O
    pub fn is_validation(&self) -> bool {
        matches!(self, TradingError::Order(_))
    }
}

pub type Result<T> = std::result::Result<T, TradingError>;
