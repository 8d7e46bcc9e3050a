use anyhow::{Context, Result};
use log::info;

use business_manager_backend::config::AppConfig;
use business_manager_backend::{create_router, initialize_backend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    let app_state = initialize_backend(&config)
        .await
        .context("Failed to open the record store")?;
    let app = create_router(app_state);

    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    axum::serve(listener, app).await?;
    Ok(())
}
