//! List open and filled orders, and show market depth
//!
//! Run with: cargo run -p orderbook-trading --example get_orders -- [SYMBOL]

use orderbook_trading::OrderBookClient;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const PAGE_SIZE: u32 = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = OrderBookClient::from_env()?;
    let symbol = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "MATIC-USDC".to_string());

    let mut page = 1;
    loop {
        let orders = client.get_orders_for_user(page, PAGE_SIZE).await?;
        for order in &orders.data {
            println!(
                "{} {} {} {} @ {} (filled {})",
                order.order_id, order.symbol, order.side, order.size, order.price, order.filled_size
            );
        }
        if orders.data.is_empty() || orders.is_last_page() {
            break;
        }
        page += 1;
    }

    let fills = client.get_filled_orders_for_user(1, PAGE_SIZE).await?;
    info!("{} filled orders", fills.total);

    let depth = client.get_market_depth(&symbol, 5).await?;
    if let (Some(ask), Some(bid)) = (depth.data.best_ask(), depth.data.best_bid()) {
        info!(
            "{} best bid {} x {}, best ask {} x {}",
            symbol,
            bid.price(),
            bid.size(),
            ask.price(),
            ask.size()
        );
    }

    for market in client.get_symbols().await? {
        println!("{} - {}", market.symbol, market.name);
    }

    Ok(())
}
