//! Server configuration.

use serde::{Deserialize, Serialize};

/// Which store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store; data is lost on restart.
    Memory,
    /// PostgreSQL via `database_url` (requires the `postgres` feature).
    Postgres,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Name used by the `GET /` greeting. Empty means no name.
    pub greeting_name: String,

    pub storage: StorageBackend,

    /// Connection URL, required when `storage = "postgres"`.
    pub database_url: Option<String>,

    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            greeting_name: "Asha".to_string(),
            storage: StorageBackend::Memory,
            database_url: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, `config/server.*` and `HUBS_*` environment variables.
    ///
    /// Later sources override earlier ones; missing keys keep their defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(config::Environment::with_prefix("HUBS").try_parsing(true));

        Self::from_builder(builder)
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let config: Self = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.storage == StorageBackend::Postgres && self.database_url.is_none() {
            anyhow::bail!("database_url must be set when storage is \"postgres\"");
        }
        Ok(())
    }
}
