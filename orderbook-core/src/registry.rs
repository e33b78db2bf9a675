//! Symbol → token lookup table
//!
//! The registry is filled once, either from the API's supported-tokens
//! endpoint or from the table bundled with this crate, and is read-only
//! afterwards. Share it behind an `Arc` between signers.

use std::collections::HashMap;

use crate::error::{OrderError, OrderResult};
use crate::token::Token;

/// Supported tokens on Polygon, keyed by symbol
const BUNDLED_POLYGON_TOKENS: &str = include_str!("../tokens/polygon.json");

#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, Token>,
}

impl TokenRegistry {
    /// Build a registry from `(symbol, token)` pairs. Symbols are upper-cased.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (S, Token)>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|(symbol, token)| (symbol.as_ref().to_uppercase(), token))
            .collect();
        Self { tokens }
    }

    /// Parse a `{"SYMBOL": {"address": "0x..", "decimals": n}}` table
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let tokens: HashMap<String, Token> = serde_json::from_str(json)?;
        Ok(Self::from_tokens(tokens))
    }

    /// The token table shipped with this crate
    pub fn bundled() -> serde_json::Result<Self> {
        Self::from_json(BUNDLED_POLYGON_TOKENS)
    }

    /// Look up a token, ignoring the case of `symbol`
    pub fn get(&self, symbol: &str) -> Option<&Token> {
        self.tokens.get(&symbol.to_uppercase())
    }

    /// Like [`get`](Self::get), failing with [`OrderError::UnknownToken`]
    pub fn resolve(&self, symbol: &str) -> OrderResult<Token> {
        self.get(symbol)
            .copied()
            .ok_or_else(|| OrderError::UnknownToken(symbol.to_uppercase()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
