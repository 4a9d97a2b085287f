//! Goods persistence: the store capability trait and its backends.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryGoodsStore;
pub use postgres::PostgresGoodsStore;
pub use r#trait::{GoodsStore, StoreError};
