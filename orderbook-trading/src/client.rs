//! Authenticated REST client for the order book API

use std::sync::Arc;

use orderbook_core::{
    CancelOrderResponse, CreateOrderResponse, MarketDepth, OrderResponse, OrdersForUserResponse,
    SupportedTokensResponse, SymbolInfo, TokenRegistry, TradeIntent,
};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::order::OrderSigner;
use crate::types::{CreateOrderRequest, Result, SignedOrder, TradingError};

// ============================================================================
// Constants
// ============================================================================

const HEADER_API_KEY: &str = "X-API-KEY";

const ORDER_PATH: &str = "api/v1/order";
const CLIENT_ORDER_PATH: &str = "api/v1/order/client-order";
const ORDERS_PATH: &str = "api/v1/orders";
const FILLS_PATH: &str = "api/v1/fills";
const ORDERBOOK_PATH: &str = "api/v1/orderbook";
const SYMBOLS_PATH: &str = "api/v1/symbols";
const SUPPORTED_TOKENS_PATH: &str = "api/v1/supported-tokens";

// ============================================================================
// Helpers
// ============================================================================

/// Headers sent with every request
pub fn default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|e| TradingError::config(format!("Invalid API key header value: {}", e)))?;
    auth.set_sensitive(true);

    headers.insert(HEADER_API_KEY, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Join `base_url` and a relative endpoint with exactly one slash
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Classify a non-success response
pub fn api_error(status: StatusCode, body: String) -> TradingError {
    if status == StatusCode::UNAUTHORIZED {
        return TradingError::Unauthorized;
    }

    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body
    };

    TradingError::ApiRequestFailed {
        status: status.as_u16(),
        message,
    }
}

// ============================================================================
// Order Book Client
// ============================================================================

/// Client for the order book REST API
///
/// Every request carries `X-API-KEY: Bearer <key>`. Non-2xx responses become
/// [`TradingError::Unauthorized`] (401) or [`TradingError::ApiRequestFailed`];
/// nothing is retried.
#[derive(Clone)]
pub struct OrderBookClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OrderBookClient {
    pub fn new(base_url: impl Into<String>, api_key: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url, api_key))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("orderbook-trading/", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers(&config.api_key)?)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create a client from environment variables (see [`ClientConfig::from_env`])
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = endpoint_url(&self.base_url, endpoint);
        debug!("{} {}", method, url);
        self.http_client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                warn!("Request rejected: invalid API key");
            } else {
                error!("Request failed: {} - {}", status, body);
            }
            return Err(api_error(status, body));
        }

        // Some DELETE endpoints answer 2xx with an empty body
        let body = if body.trim().is_empty() { "null" } else { &body };
        Ok(serde_json::from_str(body)?)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Submit a signed order
    pub async fn create_order(
        &self,
        intent: &TradeIntent,
        signed: &SignedOrder,
    ) -> Result<CreateOrderResponse> {
        info!(
            client_order_id = %intent.client_order_id,
            symbol = %intent.symbol,
            side = %intent.side,
            "Submitting order"
        );

        let body = CreateOrderRequest::new(intent, signed);
        let response: CreateOrderResponse = self
            .send(self.request(Method::POST, ORDER_PATH).json(&body))
            .await?;

        info!("Order created: {}", response.order_id);
        Ok(response)
    }

    /// Sign `intent` with `signer` and submit it
    pub async fn place_order(
        &self,
        signer: &OrderSigner,
        intent: &TradeIntent,
    ) -> Result<CreateOrderResponse> {
        let signed = signer.prepare_and_sign_order(intent, None)?;
        self.create_order(intent, &signed).await
    }

    pub async fn cancel_order_by_id(&self, order_id: &str) -> Result<CancelOrderResponse> {
        info!("Cancelling order: {}", order_id);
        self.send(self.request(Method::DELETE, &format!("{}/{}", ORDER_PATH, order_id)))
            .await
    }

    pub async fn cancel_order_by_client_id(
        &self,
        client_order_id: &str,
    ) -> Result<CancelOrderResponse> {
        info!("Cancelling order by client id: {}", client_order_id);
        self.send(self.request(
            Method::DELETE,
            &format!("{}/{}", CLIENT_ORDER_PATH, client_order_id),
        ))
        .await
    }

    /// Cancel every open order, or only those on `symbol`
    ///
    /// The response shape is not fixed by the API, so it is returned as raw JSON.
    pub async fn cancel_all_orders(&self, symbol: Option<&str>) -> Result<serde_json::Value> {
        info!(symbol = symbol.unwrap_or("*"), "Cancelling all orders");

        let mut request = self.request(Method::DELETE, ORDERS_PATH);
        if let Some(symbol) = symbol {
            request = request.query(&[("symbol", symbol)]);
        }
        self.send(request).await
    }

    pub async fn get_order_by_id(&self, order_id: &str) -> Result<OrderResponse> {
        self.send(self.request(Method::GET, &format!("{}/{}", ORDER_PATH, order_id)))
            .await
    }

    pub async fn get_order_by_client_id(&self, client_order_id: &str) -> Result<OrderResponse> {
        self.send(self.request(
            Method::GET,
            &format!("{}/{}", CLIENT_ORDER_PATH, client_order_id),
        ))
        .await
    }

    /// One page of the caller's orders; pages are 1-based
    pub async fn get_orders_for_user(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<OrdersForUserResponse> {
        self.send(
            self.request(Method::GET, ORDERS_PATH)
                .query(&[("page", page), ("pageSize", page_size)]),
        )
        .await
    }

    /// One page of the caller's filled orders; pages are 1-based
    pub async fn get_filled_orders_for_user(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<OrdersForUserResponse> {
        self.send(
            self.request(Method::GET, FILLS_PATH)
                .query(&[("page", page), ("pageSize", page_size)]),
        )
        .await
    }

    // ========================================================================
    // Market Data
    // ========================================================================

    pub async fn get_market_depth(&self, symbol: &str, limit: u32) -> Result<MarketDepth> {
        self.send(
            self.request(Method::GET, &format!("{}/{}", ORDERBOOK_PATH, symbol))
                .query(&[("limit", limit)]),
        )
        .await
    }

    pub async fn get_symbols(&self) -> Result<Vec<SymbolInfo>> {
        self.send(self.request(Method::GET, SYMBOLS_PATH)).await
    }

    pub async fn get_supported_tokens(&self) -> Result<SupportedTokensResponse> {
        self.send(self.request(Method::GET, SUPPORTED_TOKENS_PATH))
            .await
    }

    /// Fetch the supported tokens once and build a registry from them
    pub async fn load_token_registry(&self) -> Result<Arc<TokenRegistry>> {
        let response = self.get_supported_tokens().await?;
        let registry = TokenRegistry::from_tokens(response.tokens);
        info!("Loaded {} supported tokens", registry.len());
        Ok(Arc::new(registry))
    }
}

impl std::fmt::Debug for OrderBookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBookClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
