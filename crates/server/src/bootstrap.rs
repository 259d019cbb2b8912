use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use compass_agent::llm::LlmError;
use compass_agent::{ChatCompletionsClient, Strategist};
use compass_core::config::{AppConfig, ConfigError, LoadOptions};
use compass_db::{connect_with_settings, migrations, DbPool};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub strategist: Option<Arc<Strategist>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("oracle client construction failed: {0}")]
    Oracle(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Config is loaded and validated by the caller (logging wants it first);
/// this wires the pool, migrations, and the optional oracle client.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let strategist = match &config.oracle.api_key {
        Some(_) => {
            let client =
                ChatCompletionsClient::new(&config.oracle).map_err(BootstrapError::Oracle)?;
            info!(
                event_name = "system.bootstrap.oracle_ready",
                correlation_id = "bootstrap",
                model = %config.oracle.model,
                "oracle client initialized"
            );
            Some(Arc::new(Strategist::new(Arc::new(client))))
        }
        None => {
            info!(
                event_name = "system.bootstrap.oracle_absent",
                correlation_id = "bootstrap",
                "no oracle api key configured; strategy responses will degrade"
            );
            None
        }
    };

    Ok(Application { config, db_pool, strategist })
}
