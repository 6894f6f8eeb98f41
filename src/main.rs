//! HTTP service for the Efficiency Engine.
//!
//! Reads its configuration directory from `EFFICIENCY_CONFIG_DIR` and its
//! listen address from `EFFICIENCY_BIND_ADDR`.

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use efficiency_engine::api::{AppState, create_router};
use efficiency_engine::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir =
        env::var("EFFICIENCY_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr =
        env::var("EFFICIENCY_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        sites = config.catalog().site_codes().len(),
        "Loaded configuration"
    );

    let router = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, "Efficiency engine listening");
    axum::serve(listener, router).await?;

    Ok(())
}
