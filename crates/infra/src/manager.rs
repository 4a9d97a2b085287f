//! Inventory manager: the goods mutation protocol.
//!
//! Every operation re-reads current state from the injected [`GoodsStore`]
//! and performs at most one write:
//!
//! ```text
//! create:  validate document → uniqueness lookup → insert_unique
//! deduct:  validate quantity → lookup → stock pre-check → conditional decrement
//! update:  lookup → filter + validate fields → NoFields check → set_fields
//! ```
//!
//! The manager holds no lock of its own. Concurrency safety comes from the
//! store: `insert_unique` rejects a name taken since the lookup, and
//! `decrement_if_available` re-checks stock at write time, so two racing
//! deductions can never drive `stock_count` below zero.

use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use stockpile_core::DomainError;
use stockpile_inventory::{Good, GoodPatch, Quantity};

use crate::store::{GoodsStore, StoreError};

#[derive(Debug, Error)]
pub enum ManagerError {
    /// Business rule failure (validation, duplicate, not found, stock, no fields).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store failed while performing `action` (e.g. "add good").
    #[error("failed to {action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Outcome of a successful deduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    pub name: String,
    pub quantity: Quantity,
}

/// Map a store error raised while performing `action`.
///
/// A uniqueness violation reported by the store is a domain duplicate, not a
/// storage failure.
fn store_failure(action: &'static str) -> impl FnOnce(StoreError) -> ManagerError {
    move |source| match source {
        StoreError::Duplicate(name) => DomainError::duplicate(name).into(),
        source => {
            tracing::error!(action, error = %source, "goods store operation failed");
            ManagerError::Storage { action, source }
        }
    }
}

/// Owns the business rules for goods and mediates every store access.
#[derive(Debug)]
pub struct InventoryManager<S> {
    store: S,
}

impl<S> InventoryManager<S>
where
    S: GoodsStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a new good from a create payload.
    #[instrument(skip(self, payload), err(level = "debug"))]
    pub async fn create(&self, payload: &Value) -> Result<Good, ManagerError> {
        const ACTION: &str = "add good";

        let good = Good::from_document(payload)?;

        if self
            .store
            .find_by_name(&good.name)
            .await
            .map_err(store_failure(ACTION))?
            .is_some()
        {
            return Err(DomainError::duplicate(good.name).into());
        }

        self.store
            .insert_unique(&good)
            .await
            .map_err(store_failure(ACTION))?;

        tracing::info!(name = %good.name, stock_count = good.stock_count, "good added");
        Ok(good)
    }

    /// Deduct stock using a deduct body (`{"quantity"?: int}`, default 1).
    pub async fn deduct(&self, name: &str, body: &Value) -> Result<Deduction, ManagerError> {
        let quantity = Quantity::from_body(body)?;
        self.deduct_quantity(name, quantity).await
    }

    /// Deduct `quantity` items from the named good.
    ///
    /// Stock is checked against the current record first, then the decrement
    /// is applied as a conditional write that re-verifies stock at write time.
    #[instrument(skip(self, quantity), fields(quantity = quantity.get()), err(level = "debug"))]
    pub async fn deduct_quantity(&self, name: &str, quantity: Quantity) -> Result<Deduction, ManagerError> {
        const ACTION: &str = "deduct stock";

        let good = self
            .store
            .find_by_name(name)
            .await
            .map_err(store_failure(ACTION))?
            .ok_or_else(|| DomainError::not_found(name))?;

        if !good.can_supply(quantity) {
            return Err(DomainError::insufficient_stock(name, quantity.get(), Some(good.stock_count)).into());
        }

        let applied = self
            .store
            .decrement_if_available(name, quantity)
            .await
            .map_err(store_failure(ACTION))?;
        if !applied {
            tracing::info!(name, "conditional decrement matched no record; stock consumed concurrently");
            return Err(DomainError::insufficient_stock(name, quantity.get(), None).into());
        }

        tracing::info!(name, quantity = quantity.get(), "stock deducted");
        Ok(Deduction {
            name: name.to_string(),
            quantity,
        })
    }

    /// Apply the allowed fields of an update body to the named good.
    ///
    /// Returns the fields actually applied. Existence is checked before the
    /// body is looked at.
    #[instrument(skip(self, body), err(level = "debug"))]
    pub async fn update(&self, name: &str, body: &Value) -> Result<GoodPatch, ManagerError> {
        const ACTION: &str = "update good";

        if self
            .store
            .find_by_name(name)
            .await
            .map_err(store_failure(ACTION))?
            .is_none()
        {
            return Err(DomainError::not_found(name).into());
        }

        let patch = GoodPatch::from_document(body)?;
        if patch.is_empty() {
            return Err(DomainError::NoFields.into());
        }

        let matched = self
            .store
            .set_fields(name, &patch)
            .await
            .map_err(store_failure(ACTION))?;
        if !matched {
            return Err(DomainError::not_found(name).into());
        }

        tracing::info!(name, "good updated");
        Ok(patch)
    }

    /// Fetch a single good by name.
    pub async fn get(&self, name: &str) -> Result<Good, ManagerError> {
        self.store
            .find_by_name(name)
            .await
            .map_err(store_failure("read goods"))?
            .ok_or_else(|| DomainError::not_found(name).into())
    }

    /// All goods, ordered by name.
    pub async fn list(&self) -> Result<Vec<Good>, ManagerError> {
        self.store.list().await.map_err(store_failure("read goods"))
    }
}
