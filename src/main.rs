use anyhow::Result;
use crm::config::{AppConfig, CONFIG_PATH_ENV, StorageBackend};
use crm::core::service::CustomerStore;
use crm::server::ServerBuilder;
use crm::storage::{InMemoryCustomerStore, seed_sample_data};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crm=info,tower_http=info")),
        )
        .init();

    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let config = AppConfig::load(config_path.as_deref())?;

    tracing::info!(
        backend = %config.storage.backend,
        location_match = %config.query.location_match,
        "starting crm-server"
    );

    let store = open_store(&config).await?;

    if config.seed_sample_data {
        seed_sample_data(store.as_ref()).await?;
    }

    ServerBuilder::new()
        .with_shared_store(store)
        .with_config(&config)
        .serve(&config.server.bind_addr)
        .await
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn CustomerStore>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryCustomerStore::new())),
        StorageBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &AppConfig) -> Result<Arc<dyn CustomerStore>> {
    use crm::storage::PostgresCustomerStore;

    let url = config
        .storage
        .database_url
        .as_deref()
        .ok_or(crm::config::ConfigError::MissingDatabaseUrl)?;
    let store = PostgresCustomerStore::connect(url, config.storage.max_connections).await?;

    tracing::info!("connected to postgres");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &AppConfig) -> Result<Arc<dyn CustomerStore>> {
    anyhow::bail!("storage backend 'postgres' requires building with the `postgres` feature")
}
