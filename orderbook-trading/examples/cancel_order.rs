//! Cancel an order by id, by client id, or everything on a symbol
//!
//! Run with:
//!   cargo run -p orderbook-trading --example cancel_order -- id <ORDER_ID>
//!   cargo run -p orderbook-trading --example cancel_order -- client <CLIENT_ORDER_ID>
//!   cargo run -p orderbook-trading --example cancel_order -- all [SYMBOL]

use orderbook_trading::OrderBookClient;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = OrderBookClient::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["id", order_id] => {
            let response = client.cancel_order_by_id(order_id).await?;
            info!("Cancelled order {}", response.order_id);
        }
        ["client", client_order_id] => {
            let response = client.cancel_order_by_client_id(client_order_id).await?;
            info!("Cancelled order {}", response.order_id);
        }
        ["all"] => {
            let response = client.cancel_all_orders(None).await?;
            info!("Cancelled all orders: {}", response);
        }
        ["all", symbol] => {
            let response = client.cancel_all_orders(Some(*symbol)).await?;
            info!("Cancelled all {} orders: {}", symbol, response);
        }
        _ => anyhow::bail!("usage: cancel_order (id <ORDER_ID> | client <CLIENT_ORDER_ID> | all [SYMBOL])"),
    }

    Ok(())
}
