use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockpile_inventory::{Good, GoodPatch, Quantity};

use super::r#trait::{GoodsStore, StoreError};

/// In-memory goods store keyed by name.
///
/// Intended for tests/dev. Each operation runs under a single lock, which
/// makes every capability atomic.
#[derive(Debug, Default)]
pub struct InMemoryGoodsStore {
    goods: RwLock<BTreeMap<String, Good>>,
}

impl InMemoryGoodsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl GoodsStore for InMemoryGoodsStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Good>, StoreError> {
        let goods = self.goods.read().map_err(poisoned)?;
        Ok(goods.get(name).cloned())
    }

    async fn insert_unique(&self, good: &Good) -> Result<(), StoreError> {
        let mut goods = self.goods.write().map_err(poisoned)?;
        if goods.contains_key(&good.name) {
            return Err(StoreError::Duplicate(good.name.clone()));
        }
        goods.insert(good.name.clone(), good.clone());
        Ok(())
    }

    async fn decrement_if_available(&self, name: &str, quantity: Quantity) -> Result<bool, StoreError> {
        let mut goods = self.goods.write().map_err(poisoned)?;
        Ok(goods.get_mut(name).is_some_and(|good| good.take_stock(quantity)))
    }

    async fn set_fields(&self, name: &str, patch: &GoodPatch) -> Result<bool, StoreError> {
        let mut goods = self.goods.write().map_err(poisoned)?;
        if !goods.contains_key(name) {
            return Ok(false);
        }

        if let Some(new_name) = patch.name.as_deref() {
            if new_name != name && goods.contains_key(new_name) {
                return Err(StoreError::Duplicate(new_name.to_string()));
            }
        }

        let Some(mut good) = goods.remove(name) else {
            return Ok(false);
        };
        good.apply(patch);
        goods.insert(good.name.clone(), good);
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<Good>, StoreError> {
        let goods = self.goods.read().map_err(poisoned)?;
        Ok(goods.values().cloned().collect())
    }
}
