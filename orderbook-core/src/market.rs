//! Response shapes returned by the order book API

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::Side;
use crate::token::Token;

/// Response from order creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
}

/// Response from cancelling a single order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
    pub order_id: String,
}

/// An order as stored by the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub price: Decimal,
    pub symbol: String,
    pub size: Decimal,
    pub pending_size: Decimal,
    pub filled_size: Decimal,
    pub side: Side,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub cancelled: bool,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}

pub type OrdersForUserResponse = Paginated<OrderResponse>;

/// A tradable market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: String,
}

/// `[price, size]` pair in the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel(pub Decimal, pub Decimal);

impl DepthLevel {
    pub fn price(&self) -> Decimal {
        self.0
    }

    pub fn size(&self) -> Decimal {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDepthData {
    pub asks: Vec<DepthLevel>,
    pub bids: Vec<DepthLevel>,
    pub symbol: String,
    pub time: i64,
}

impl MarketDepthData {
    pub fn best_ask(&self) -> Option<&DepthLevel> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&DepthLevel> {
        self.bids.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDepth {
    pub code: String,
    pub data: MarketDepthData,
}

/// Response from the supported-tokens endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedTokensResponse {
    pub tokens: HashMap<String, Token>,
}
