//! Furnish Storefront - furniture marketplace HTTP service

use anyhow::Result;
use furnish_storefront::{
    catalog::Catalog,
    config::StorefrontConfig,
    http::{router, AppState},
    storage::{JsonFileStore, KeyValueStore},
    Storefront,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = StorefrontConfig::from_env();
    let store: Box<dyn KeyValueStore> = Box::new(JsonFileStore::open(&config.data_path)?);
    let shop = Storefront::open(store, Catalog::seeded()?, config.pricing.clone())?;
    let app = router(AppState::new(shop, config.checkout_delay));

    let addr = config.server_addr();
    tracing::info!(data_path = %config.data_path.display(), "Furnish storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
