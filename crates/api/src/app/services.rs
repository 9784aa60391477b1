//! Store wiring shared by every handler.

use std::sync::Arc;

use hubs_infra::{InMemoryStore, PostStore, UserStore};

use crate::config::{AppConfig, StorageBackend};

/// Collaborators reachable from handlers (installed as an `Extension`).
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
}

impl AppServices {
    pub fn new(users: Arc<dyn UserStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { users, posts }
    }

    /// Both resources over one in-memory store (dev/test).
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store)
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices").finish_non_exhaustive()
    }
}

/// Build the store selected by `config.storage`.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::info!("using in-memory store");
            Ok(AppServices::in_memory())
        }
        StorageBackend::Postgres => build_postgres_services(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("database_url must be set when storage is \"postgres\""))?;

    let store = Arc::new(hubs_infra::PostgresStore::connect(url).await?);
    store.migrate().await?;
    tracing::info!("using postgres store");
    Ok(AppServices::new(store.clone(), store))
}

#[cfg(not(feature = "postgres"))]
async fn build_postgres_services(_config: &AppConfig) -> anyhow::Result<AppServices> {
    anyhow::bail!("storage \"postgres\" requires building hubs-api with the `postgres` feature")
}
