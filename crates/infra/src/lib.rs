//! Infrastructure layer: goods storage backends, the inventory manager that
//! drives them, and process configuration.

pub mod config;
pub mod manager;
pub mod store;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use manager::{Deduction, InventoryManager, ManagerError};
pub use store::{GoodsStore, InMemoryGoodsStore, PostgresGoodsStore, StoreError};
