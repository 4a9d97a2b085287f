//! Service wiring: picks the goods store backend and owns the inventory manager.
//!
//! The store handle is created once at startup and injected into the manager;
//! handlers reach it through an `Extension<Arc<AppServices>>`.

use std::sync::Arc;

use stockpile_infra::{
    GoodsStore, InMemoryGoodsStore, InventoryManager, PostgresGoodsStore, StoreBackend, StoreError,
};

/// Manager over a type-erased store, so handlers don't care which backend is live.
pub type SharedManager = InventoryManager<Arc<dyn GoodsStore>>;

pub struct AppServices {
    manager: SharedManager,
    postgres: Option<PostgresGoodsStore>,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        let store: Arc<dyn GoodsStore> = Arc::new(InMemoryGoodsStore::new());
        Self {
            manager: InventoryManager::new(store),
            postgres: None,
        }
    }

    /// Postgres wiring: connect, make sure the `goods` table exists.
    pub async fn persistent(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pg = PostgresGoodsStore::connect(database_url, max_connections).await?;
        pg.ensure_schema().await?;

        let store: Arc<dyn GoodsStore> = Arc::new(pg.clone());
        Ok(Self {
            manager: InventoryManager::new(store),
            postgres: Some(pg),
        })
    }

    pub async fn from_backend(backend: &StoreBackend) -> Result<Self, StoreError> {
        match backend {
            StoreBackend::InMemory => {
                tracing::warn!("DATABASE_URL not set; goods are kept in memory only");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => Self::persistent(database_url, *max_connections).await,
        }
    }

    pub fn manager(&self) -> &SharedManager {
        &self.manager
    }

    pub fn backend_name(&self) -> &'static str {
        if self.postgres.is_some() { "postgres" } else { "in_memory" }
    }

    /// Release backend resources (closes the Postgres pool).
    pub async fn shutdown(&self) {
        if let Some(pg) = &self.postgres {
            pg.close().await;
        }
    }
}
