//! Build and sign an order without sending it
//!
//! Run with: cargo run -p orderbook-trading --example sign_order
//!
//! Uses ORDERBOOK_PRIVATE_KEY if set, otherwise a throwaway wallet.

use std::sync::Arc;

use orderbook_trading::{
    DeploymentConfig, OrderSigner, OrderWallet, TokenRegistry, TradeIntent, recover_signer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orderbook_trading=debug")),
        )
        .init();

    let wallet = OrderWallet::from_env().unwrap_or_else(|_| OrderWallet::generate());
    let signer = OrderSigner::new(
        wallet,
        Arc::new(TokenRegistry::bundled()?),
        DeploymentConfig::repermit(),
    );

    let intent = TradeIntent::parse(
        "MATIC-USDC",
        "sell",
        "40",
        "0.865",
        uuid::Uuid::new_v4().to_string(),
    )?;
    let signed = signer.prepare_and_sign_order(&intent, None)?;

    println!("{}", serde_json::to_string_pretty(&signed.message)?);
    println!("signature: {}", signed.signature);

    let recovered = recover_signer(&signed.message, &signed.signature)?;
    info!("Recovered signer {} (wallet {})", recovered, signer.address());

    Ok(())
}
