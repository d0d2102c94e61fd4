use anyhow::Result;
use harvester_admin::{config::AppConfig, http};
use harvester_client::BackendClient;
use std::{net::SocketAddr, sync::Arc};
use tracing::{Level, debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    info!("Starting Harvester admin service");

    // Fails fast without a Harvester host
    let config = AppConfig::from_env()?;
    info!("{}", config);

    if let Some(auth) = &config.harvester.basic_auth {
        info!("Using basic auth user {}", auth.username);
    }
    if config.filter_by_tenant {
        debug!("Tenant filtering is enabled but not applied to Harvester calls");
    }

    let backend = BackendClient::new(config.harvester.clone())?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.service_port));

    // Start the HTTP server
    http::start_server(Arc::new(backend), addr).await?;

    Ok(())
}
