//! Validation errors raised while turning a trade intent into an order message

use std::fmt;

use thiserror::Error;

/// Which leg of a swap a token symbol was resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLeg {
    In,
    Out,
}

impl fmt::Display for TokenLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenLeg::In => write!(f, "in"),
            TokenLeg::Out => write!(f, "out"),
        }
    }
}

/// Order validation error
///
/// All of these are input errors: they are raised synchronously, before any
/// network or cryptographic work, and retrying the same input never helps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Invalid symbol format: {0}. Expected format 'TOKEN1-TOKEN2'")]
    InvalidSymbolFormat(String),

    #[error("Invalid side: {0}. Expected 'buy' or 'sell'")]
    InvalidSide(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Invalid '{leg}' token symbol: {symbol}")]
    InvalidToken { symbol: String, leg: TokenLeg },

    #[error("Price has more than {max} decimal places: {price}")]
    ExcessDecimalPlaces { price: String, max: u32 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),
}

impl OrderError {
    pub fn invalid_symbol(symbol: impl Into<String>) -> Self {
        OrderError::InvalidSymbolFormat(symbol.into())
    }

    pub fn invalid_side(side: impl Into<String>) -> Self {
        OrderError::InvalidSide(side.into())
    }

    pub fn invalid_token(symbol: impl Into<String>, leg: TokenLeg) -> Self {
        OrderError::InvalidToken {
            symbol: symbol.into(),
            leg,
        }
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        OrderError::InvalidAmount(msg.into())
    }
}

/// Result type alias for order validation
pub type OrderResult<T> = Result<T, OrderError>;
