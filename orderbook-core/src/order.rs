//! Trade intents: what the caller wants to trade, before any signing

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, OrderResult};

/// Separator between base and quote in a market symbol
pub const SYMBOL_SEPARATOR: char = '-';

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(OrderError::invalid_side(other)),
        }
    }
}

/// Split a `BASE-QUOTE` symbol into upper-cased `(base, quote)`
pub fn parse_symbol(symbol: &str) -> OrderResult<(String, String)> {
    let upper = symbol.to_uppercase();
    let mut parts = upper.split(SYMBOL_SEPARATOR);

    match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) if !base.is_empty() && !quote.is_empty() => {
            Ok((base.to_string(), quote.to_string()))
        }
        _ => Err(OrderError::invalid_symbol(symbol)),
    }
}

/// An order the caller wants placed
///
/// Serializes to the camelCase fields the create-order endpoint expects, with
/// `price` and `size` as decimal strings. The deadline is not sent directly;
/// it travels inside the signed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeIntent {
    pub price: Decimal,
    pub size: Decimal,
    /// Market symbol, e.g. `MATIC-USDC`
    pub symbol: String,
    pub side: Side,
    pub client_order_id: String,
    #[serde(skip)]
    pub deadline: Option<DateTime<Utc>>,
}

impl TradeIntent {
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        size: Decimal,
        price: Decimal,
        client_order_id: impl Into<String>,
    ) -> Self {
        Self {
            price,
            size,
            symbol: symbol.into(),
            side,
            client_order_id: client_order_id.into(),
            deadline: None,
        }
    }

    /// Build an intent from raw strings
    ///
    /// Checks run in a fixed order: symbol format, then side, then the two
    /// amounts. Token existence is checked later, against a registry.
    pub fn parse(
        symbol: &str,
        side: &str,
        size: &str,
        price: &str,
        client_order_id: impl Into<String>,
    ) -> OrderResult<Self> {
        parse_symbol(symbol)?;
        let side = side.parse()?;
        let size = parse_decimal("size", size)?;
        let price = parse_decimal("price", price)?;

        Ok(Self::new(symbol, side, size, price, client_order_id))
    }

    /// Set how long the order signature stays valid
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

fn parse_decimal(field: &str, value: &str) -> OrderResult<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| OrderError::invalid_amount(format!("{} '{}': {}", field, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_symbol() {
        assert_eq!(
            parse_symbol("matic-usdc").unwrap(),
            ("MATIC".to_string(), "USDC".to_string())
        );

        for bad in ["MATICUSDC", "MATIC-USDC-ETH", "-USDC", "MATIC-", "-", ""] {
            assert_eq!(
                parse_symbol(bad).unwrap_err(),
                OrderError::InvalidSymbolFormat(bad.to_string()),
                "symbol {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Sell);
        assert_eq!(
            "hold".parse::<Side>().unwrap_err(),
            OrderError::InvalidSide("hold".to_string())
        );
        assert!("BUY".parse::<Side>().is_err());
    }

    #[test]
    fn test_parse_checks_symbol_before_side() {
        let err = TradeIntent::parse("MATICUSDC", "hold", "40", "0.865", "id").unwrap_err();
        assert!(matches!(err, OrderError::InvalidSymbolFormat(_)));

        let err = TradeIntent::parse("MATIC-USDC", "hold", "40", "0.865", "id").unwrap_err();
        assert!(matches!(err, OrderError::InvalidSide(_)));
    }

    #[test]
    fn test_parse_intent() {
        let intent = TradeIntent::parse("MATIC-USDC", "sell", "40", "0.86500000", "abc").unwrap();

        assert_eq!(intent.side, Side::Sell);
        assert_eq!(intent.size, dec!(40));
        assert_eq!(intent.price, dec!(0.865));
        assert_eq!(intent.price.scale(), 8);
        assert_eq!(intent.client_order_id, "abc");
        assert!(intent.deadline.is_none());

        let err = TradeIntent::parse("MATIC-USDC", "sell", "forty", "0.865", "abc").unwrap_err();
        assert!(matches!(err, OrderError::InvalidAmount(_)));
    }

    #[test]
    fn test_intent_wire_format() {
        let intent = TradeIntent::new(
            "MATIC-USDC",
            Side::Sell,
            dec!(40),
            dec!(0.865),
            "550e8400-e29b-41d4-a716-446655440000",
        )
        .with_deadline(Utc::now());

        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["price"], "0.865");
        assert_eq!(json["size"], "40");
        assert_eq!(json["symbol"], "MATIC-USDC");
        assert_eq!(json["side"], "sell");
        assert_eq!(json["clientOrderId"], "550e8400-e29b-41d4-a716-446655440000");
        assert!(json.get("deadline").is_none());
    }
}
