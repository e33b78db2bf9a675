//! Sign a limit order and submit it
//!
//! Run with: cargo run -p orderbook-trading --example create_order
//!
//! Requires ORDERBOOK_API_KEY and ORDERBOOK_PRIVATE_KEY (a `.env` file works).

use orderbook_trading::{ClientConfig, OrderBookClient, OrderSigner, TradeIntent};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orderbook_trading=debug")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    info!("Using {:?}", config);

    let client = OrderBookClient::from_config(&config)?;
    let registry = client.load_token_registry().await?;
    let signer = OrderSigner::from_config(&config, registry)?;

    let intent = TradeIntent::parse(
        "MATIC-USDC",
        "sell",
        "40",
        "0.865",
        uuid::Uuid::new_v4().to_string(),
    )?;
    let signed = signer.prepare_and_sign_order(&intent, None)?;
    let response = client.create_order(&intent, &signed).await?;

    info!(
        "Created order {} (client id {})",
        response.order_id, intent.client_order_id
    );

    let order = client.get_order_by_id(&response.order_id).await?;
    println!("{}", serde_json::to_string_pretty(&order)?);

    Ok(())
}
