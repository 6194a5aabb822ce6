//! Product data context: find, list, add, update and remove against PostgreSQL.

use crate::error::AppError;
use crate::model::{Product, ProductInput};
use async_trait::async_trait;
use sqlx::PgPool;

/// Per-request accessor over the products table. Implementations hold no state between
/// calls beyond their connection pool.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, in store order.
    async fn list(&self) -> Result<Vec<Product>, AppError>;

    async fn find(&self, id: i32) -> Result<Option<Product>, AppError>;

    /// Insert and return the row with its generated id.
    async fn create(&self, input: &ProductInput) -> Result<Product, AppError>;

    /// Replace name and price. `None` when no row has `id`.
    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>, AppError>;

    /// Remove the row if present; returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;

    /// Round-trip to the backing database.
    async fn ping(&self) -> Result<(), AppError>;
}

const SELECT_ALL: &str = "SELECT id, name, price FROM products ORDER BY id";
const SELECT_BY_ID: &str = "SELECT id, name, price FROM products WHERE id = $1";
const INSERT: &str = "INSERT INTO products (name, price) VALUES ($1, $2) RETURNING id, name, price";
const UPDATE: &str = "UPDATE products SET name = $1, price = $2 WHERE id = $3 RETURNING id, name, price";
const DELETE: &str = "DELETE FROM products WHERE id = $1";

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        PgProductStore { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        tracing::debug!(sql = %SELECT_ALL, "query");
        let rows = sqlx::query_as::<_, Product>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find(&self, id: i32) -> Result<Option<Product>, AppError> {
        tracing::debug!(sql = %SELECT_BY_ID, id, "query");
        let row = sqlx::query_as::<_, Product>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, input: &ProductInput) -> Result<Product, AppError> {
        tracing::debug!(sql = %INSERT, name = %input.name, price = %input.price, "query");
        let row = sqlx::query_as::<_, Product>(INSERT)
            .bind(&input.name)
            .bind(input.stored_price())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>, AppError> {
        tracing::debug!(sql = %UPDATE, id, name = %input.name, price = %input.price, "query");
        let row = sqlx::query_as::<_, Product>(UPDATE)
            .bind(&input.name)
            .bind(input.stored_price())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        tracing::debug!(sql = %DELETE, id, "query");
        let result = sqlx::query(DELETE).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ensure_products_table;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn input(name: &str, price: &str) -> ProductInput {
        ProductInput {
            name: name.into(),
            price: Decimal::from_str(price).unwrap(),
        }
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server at DATABASE_URL"]
    async fn create_find_update_delete(pool: PgPool) {
        ensure_products_table(&pool).await.unwrap();
        let store = PgProductStore::new(pool);

        let created = store.create(&input("Widget", "12.5")).await.unwrap();
        assert_eq!(created.name, "Widget");
        assert_eq!(created.price, Decimal::from_str("12.50").unwrap());
        assert_eq!(store.find(created.id).await.unwrap(), Some(created.clone()));

        let updated = store
            .update(created.id, &input("Gadget", "99.99"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Gadget");

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert_eq!(store.find(created.id).await.unwrap(), None);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server at DATABASE_URL"]
    async fn update_of_missing_row_returns_none(pool: PgPool) {
        ensure_products_table(&pool).await.unwrap();
        let store = PgProductStore::new(pool);
        assert_eq!(store.update(4242, &input("Ghost", "1")).await.unwrap(), None);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server at DATABASE_URL"]
    async fn list_returns_every_row(pool: PgPool) {
        ensure_products_table(&pool).await.unwrap();
        let store = PgProductStore::new(pool);
        store.create(&input("A", "1")).await.unwrap();
        store.create(&input("B", "2")).await.unwrap();
        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
        store.ping().await.unwrap();
    }
}
