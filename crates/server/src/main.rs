mod app;
mod bootstrap;
mod contact;
mod health;
mod strategy;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use compass_core::config::{AppConfig, LoadOptions};
use compass_db::{SqlContactRepository, SqlLeadRepository};

fn init_logging(config: &AppConfig) {
    use compass_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let application = bootstrap::bootstrap_with_config(config).await?;

    let state = app::ApiState {
        strategist: application.strategist.clone(),
        leads: Arc::new(SqlLeadRepository::new(application.db_pool.clone())),
        contacts: Arc::new(SqlContactRepository::new(application.db_pool.clone())),
    };
    let static_dir = application.config.server.static_dir.clone();
    let router =
        app::router(state, application.db_pool.clone(), static_dir.as_deref().map(Path::new));

    let address = format!(
        "{}:{}",
        application.config.server.bind_address, application.config.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        static_site = static_dir.as_deref().unwrap_or("<disabled>"),
        "compass-server started"
    );

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "compass-server stopping"
    );

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
