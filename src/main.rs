//! OpenSASE Cart - storefront cart service

use anyhow::Result;
use opensase_cart::{api, CartStore, Services, StoreConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = StoreConfig::from_env()?;
    let services = Services::simulated(&config);
    let store = Arc::new(CartStore::init(config.clone(), services).await?);
    if let Some(error) = store.error() { tracing::warn!("Starting with an empty catalog: {}", error); }

    let app = api::router(store.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("🚀 OpenSASE Cart listening on 0.0.0.0:{}", config.port);
    axum::serve(listener, app).with_graceful_shutdown(async { tokio::signal::ctrl_c().await.ok(); }).await?;
    store.shutdown().await;
    Ok(())
}
