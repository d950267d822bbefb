mod api;
mod config;
mod console;
mod session;
mod store;
mod utils;

use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::load()?;

    let store = store::LocalStore::open(&config.data_dir)
        .await
        .with_context(|| format!("Failed to open storage at {}", config.data_dir.display()))?;
    let backend = api::HttpBackend::new(&config.api_url, Duration::from_secs(config.api_timeout))?;
    info!("Using health assistant API at {}", config.api_url);

    let (notifier, notices) = session::Notifier::channel();
    let controller =
        session::SessionController::new(&config, Arc::new(backend), Arc::new(store), notifier);
    let console = console::Console::new(controller, notices);

    tokio::select! {
        result = console.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    info!("Shutdown complete");
    Ok(())
}
