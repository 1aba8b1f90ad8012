use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::{memory::MemoryStore, postgres::PgStore, store::LeitnerStore};

/// The application's state.
#[derive(Clone)]
pub struct AppState<S> {
    /// The storage backend.
    pub store: S,
    /// The application's configuration.
    pub config: Arc<Config>,
}

impl<S: LeitnerStore> AppState<S> {
    /// Creates a new `AppState` over an existing store.
    pub fn with_store(store: S, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

impl AppState<PgStore> {
    /// Creates a new `AppState` backed by PostgreSQL.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `database_url` - The URL of the PostgreSQL database.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn connect(config: &Config, database_url: &str) -> Result<Self> {
        let pool = crate::db::create_pool(database_url, config.db_pool_max_size)?;
        crate::db::migrate(&pool).await?;
        tracing::info!(
            "✅ PostgreSQL Pool initialized with deadpool-postgres (max {} connections)",
            config.db_pool_max_size
        );

        Ok(Self::with_store(PgStore::new(pool), config.clone()))
    }
}

impl AppState<MemoryStore> {
    /// Creates a new `AppState` that keeps everything in memory.
    pub fn in_memory(config: &Config) -> Self {
        Self::with_store(MemoryStore::new(), config.clone())
    }
}
