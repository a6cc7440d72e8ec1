use crate::error::AppResult;
use crate::model::{DbConnection, ModelManager, ResourceType};

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod model;

static APPLICATION_NAME: &str = "speechdrill";

/// Connects to the configured database. The pool is lazy, nothing is
/// dialed until the first query.
pub fn build_model_manager(config: &Config) -> AppResult<ModelManager> {
    let db = DbConnection::connect_with(
        config.database().uri(),
        config.database().max_connections(),
    )?;
    Ok(ModelManager::new(db))
}

/// Loads the config, connects and brings the schema up to date.
#[tracing::instrument]
pub async fn setup_database() -> AppResult<ModelManager> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await?;

    let mm = build_model_manager(config)?;
    model::migrate(&mm).await?;
    Ok(mm)
}

/// Row count per table.
pub async fn table_summary(mm: &ModelManager) -> AppResult<Vec<(ResourceType, i64)>> {
    let mut summary = Vec::with_capacity(ResourceType::ALL.len());
    for resource in ResourceType::ALL {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", resource.table()))
            .fetch_one(mm.executor())
            .await
            .map_err(model::DatabaseError::from)?;
        summary.push((resource, count));
    }
    Ok(summary)
}

pub fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    let mm = setup_database().await?;

    for (resource, count) in table_summary(&mm).await? {
        tracing::info!("{} rows: {}", resource.table(), count);
    }
    tracing::info!("schema is up to date");
    Ok(())
}
