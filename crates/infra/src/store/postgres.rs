//! Postgres-backed goods store.
//!
//! Goods live in a single `goods` table keyed by `name`. The database enforces
//! the two invariants the inventory relies on under concurrency:
//!
//! - `name` is the primary key, so concurrent creates (or a rename onto a
//!   taken name) cannot produce duplicates.
//! - Stock decrements are a single `UPDATE ... WHERE stock_count >= $q`, so a
//!   decrement either sees enough stock at write time or matches no row.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | Other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use stockpile_inventory::{Good, GoodPatch, Quantity};

use super::r#trait::{GoodsStore, StoreError};

const CREATE_GOODS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS goods (
    name            TEXT PRIMARY KEY,
    category        TEXT NOT NULL,
    price_per_item  DOUBLE PRECISION NOT NULL,
    description     TEXT NOT NULL,
    stock_count     BIGINT NOT NULL CHECK (stock_count >= 0)
)
"#;

/// Postgres-backed goods store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and can be shared
/// across request handlers.
#[derive(Debug, Clone)]
pub struct PostgresGoodsStore {
    pool: Arc<PgPool>,
}

impl PostgresGoodsStore {
    /// Create a new PostgresGoodsStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e, None))?;
        Ok(Self::new(pool))
    }

    /// Create the `goods` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_GOODS_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e, None))?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl GoodsStore for PostgresGoodsStore {
    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> Result<Option<Good>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT name, category, price_per_item, description, stock_count
            FROM goods
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_name", e, None))?;

        row.map(|r| good_from_row(&r)).transpose()
    }

    #[instrument(skip(self, good), fields(name = %good.name), err)]
    async fn insert_unique(&self, good: &Good) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO goods (name, category, price_per_item, description, stock_count)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&good.name)
        .bind(&good.category)
        .bind(good.price_per_item)
        .bind(&good.description)
        .bind(good.stock_count)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_unique", e, Some(good.name.as_str())))?;
        Ok(())
    }

    #[instrument(skip(self, quantity), fields(quantity = quantity.get()), err)]
    async fn decrement_if_available(&self, name: &str, quantity: Quantity) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE goods
            SET stock_count = stock_count - $2
            WHERE name = $1 AND stock_count >= $2
            "#,
        )
        .bind(name)
        .bind(quantity.get())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("decrement_if_available", e, None))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, patch), err)]
    async fn set_fields(&self, name: &str, patch: &GoodPatch) -> Result<bool, StoreError> {
        if patch.is_empty() {
            return Ok(self.find_by_name(name).await?.is_some());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE goods SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(v) = &patch.name {
                set.push("name = ").push_bind_unseparated(v.clone());
            }
            if let Some(v) = &patch.category {
                set.push("category = ").push_bind_unseparated(v.clone());
            }
            if let Some(v) = patch.price_per_item {
                set.push("price_per_item = ").push_bind_unseparated(v);
            }
            if let Some(v) = &patch.description {
                set.push("description = ").push_bind_unseparated(v.clone());
            }
            if let Some(v) = patch.stock_count {
                set.push("stock_count = ").push_bind_unseparated(v);
            }
        }
        qb.push(" WHERE name = ").push_bind(name.to_string());

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_fields", e, patch.name.as_deref()))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Good>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT name, category, price_per_item, description, stock_count
            FROM goods
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e, None))?;

        rows.iter().map(good_from_row).collect()
    }
}

fn good_from_row(row: &PgRow) -> Result<Good, StoreError> {
    let read = |e: sqlx::Error| StoreError::Backend(format!("failed to read goods row: {e}"));
    Ok(Good {
        name: row.try_get("name").map_err(read)?,
        category: row.try_get("category").map_err(read)?,
        price_per_item: row.try_get("price_per_item").map_err(read)?,
        description: row.try_get("description").map_err(read)?,
        stock_count: row.try_get("stock_count").map_err(read)?,
    })
}

/// Map a SQLx error to a store error.
///
/// `name` is the good name a unique violation should be reported against.
fn map_sqlx_error(operation: &str, err: sqlx::Error, name: Option<&str>) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::Duplicate(name.unwrap_or_default().to_string());
            }
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        other => StoreError::Backend(format!("error in {operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> PostgresGoodsStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
        let store = PostgresGoodsStore::connect(&url, 2).await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    fn good(name: &str, stock: i64) -> Good {
        Good {
            name: name.to_string(),
            category: "Tools".to_string(),
            price_per_item: 2.5,
            description: String::new(),
            stock_count: stock,
        }
    }

    fn unique_name(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn insert_find_and_duplicate() {
        let store = store().await;
        let name = unique_name("widget");

        store.insert_unique(&good(&name, 5)).await.unwrap();
        assert_eq!(store.find_by_name(&name).await.unwrap(), Some(good(&name, 5)));

        let err = store.insert_unique(&good(&name, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(n) if n == name));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn conditional_decrement_never_goes_negative() {
        let store = store().await;
        let name = unique_name("bolt");
        store.insert_unique(&good(&name, 3)).await.unwrap();

        let q = Quantity::new(3).unwrap();
        assert!(store.decrement_if_available(&name, q).await.unwrap());
        assert!(!store.decrement_if_available(&name, q).await.unwrap());
        assert_eq!(store.find_by_name(&name).await.unwrap().unwrap().stock_count, 0);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn set_fields_merges() {
        let store = store().await;
        let name = unique_name("nut");
        store.insert_unique(&good(&name, 10)).await.unwrap();

        let patch = GoodPatch {
            stock_count: Some(50),
            ..GoodPatch::default()
        };
        assert!(store.set_fields(&name, &patch).await.unwrap());

        let mut expected = good(&name, 10);
        expected.stock_count = 50;
        assert_eq!(store.find_by_name(&name).await.unwrap(), Some(expected));
    }
}
