use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockpile_inventory::{Good, GoodPatch, Quantity};

/// Goods store operation error.
///
/// These are **infrastructure errors** (uniqueness constraint, connectivity,
/// backend failures) as opposed to domain errors (validation, stock rules).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's uniqueness constraint on `name` rejected the write.
    #[error("a good named '{0}' already exists")]
    Duplicate(String),

    /// The backend could not be reached (pool closed, timeout, IO).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

/// Capability set the inventory manager needs from a document store.
///
/// Every method is a single atomic operation against one good. The store is
/// the enforcement point for uniqueness (`insert_unique`) and for
/// non-negative stock (`decrement_if_available`).
#[async_trait]
pub trait GoodsStore: Send + Sync {
    /// Find the good with this name, if any.
    async fn find_by_name(&self, name: &str) -> Result<Option<Good>, StoreError>;

    /// Insert a new good. Fails with [`StoreError::Duplicate`] if the name is taken.
    async fn insert_unique(&self, good: &Good) -> Result<(), StoreError>;

    /// Compare-and-update: subtract `quantity` from `stock_count` only if the
    /// current count is still `>= quantity` at write time.
    ///
    /// Returns `false` when no record matched (missing, or not enough stock).
    async fn decrement_if_available(&self, name: &str, quantity: Quantity) -> Result<bool, StoreError>;

    /// Merge the present fields of `patch` into the named good in one write.
    ///
    /// Returns `false` when no record matched. A rename onto an existing name
    /// fails with [`StoreError::Duplicate`].
    async fn set_fields(&self, name: &str, patch: &GoodPatch) -> Result<bool, StoreError>;

    /// All goods, ordered by name.
    async fn list(&self) -> Result<Vec<Good>, StoreError>;
}

#[async_trait]
impl<S> GoodsStore for Arc<S>
where
    S: GoodsStore + ?Sized,
{
    async fn find_by_name(&self, name: &str) -> Result<Option<Good>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn insert_unique(&self, good: &Good) -> Result<(), StoreError> {
        (**self).insert_unique(good).await
    }

    async fn decrement_if_available(&self, name: &str, quantity: Quantity) -> Result<bool, StoreError> {
        (**self).decrement_if_available(name, quantity).await
    }

    async fn set_fields(&self, name: &str, patch: &GoodPatch) -> Result<bool, StoreError> {
        (**self).set_fields(name, patch).await
    }

    async fn list(&self) -> Result<Vec<Good>, StoreError> {
        (**self).list().await
    }
}
