//! Postgres-backed overlay store.
//!
//! ## Atomicity
//!
//! Every mutation is a single SQL statement, so Postgres row locks serialize
//! writers on the same id and leave writers on different ids alone:
//!
//! - `upsert` is `INSERT … ON CONFLICT (id) DO UPDATE … RETURNING`
//! - `delete` is `DELETE … RETURNING id`; no returned row means `NotFound`
//!
//! `updated_at` only moves when an attribute changes, so replaying an
//! identical upsert is a no-op.
//!
//! ## Error Mapping
//!
//! All SQLx errors become `OverlayStoreError::Storage` with the operation
//! name attached. The HTTP layer never shows this text to callers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use premier_core::ProductId;
use premier_overlay::{OverlayStore, OverlayStoreError, PremiumAttributes, PremiumRecord};

/// Postgres-backed premium overlay.
///
/// Uses a SQLx connection pool, which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresOverlayStore {
    pool: Arc<PgPool>,
}

impl PostgresOverlayStore {
    /// Create a new PostgresOverlayStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, OverlayStoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create the `premium_products` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), OverlayStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS premium_products (
                id          TEXT PRIMARY KEY,
                image       TEXT NOT NULL DEFAULT '',
                title       TEXT NOT NULL,
                price       TEXT NOT NULL DEFAULT '',
                is_premium  BOOLEAN NOT NULL DEFAULT TRUE,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS premium_products_created_at_idx ON premium_products (created_at, id)",
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl OverlayStore for PostgresOverlayStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: &ProductId) -> Result<Option<PremiumRecord>, OverlayStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, image, title, price, created_at, updated_at
            FROM premium_products
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| PremiumRow::from_pg(&r)?.into_record()).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_all(&self) -> Result<Vec<PremiumRecord>, OverlayStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, image, title, price, created_at, updated_at
            FROM premium_products
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_all", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(PremiumRow::from_pg(&row)?.into_record()?);
        }
        Ok(records)
    }

    #[instrument(skip(self), err)]
    async fn list_ids(&self) -> Result<Vec<ProductId>, OverlayStoreError> {
        let rows = sqlx::query("SELECT id FROM premium_products ORDER BY created_at ASC, id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_ids", e))?;

        rows.iter()
            .map(|r| {
                let raw: String = r.try_get("id").map_err(|e| map_sqlx_error("list_ids", e))?;
                parse_id(raw)
            })
            .collect()
    }

    #[instrument(skip(self, attributes), fields(product_id = %id), err)]
    async fn upsert(
        &self,
        id: ProductId,
        attributes: PremiumAttributes,
    ) -> Result<PremiumRecord, OverlayStoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO premium_products (id, image, title, price, is_premium, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, NOW(), NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                image = EXCLUDED.image,
                title = EXCLUDED.title,
                price = EXCLUDED.price,
                is_premium = TRUE,
                updated_at = CASE
                    WHEN (premium_products.image, premium_products.title, premium_products.price)
                         IS DISTINCT FROM (EXCLUDED.image, EXCLUDED.title, EXCLUDED.price)
                    THEN NOW()
                    ELSE premium_products.updated_at
                END
            RETURNING id, image, title, price, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(attributes.image_url())
        .bind(attributes.title())
        .bind(attributes.price_display())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert", e))?;

        PremiumRow::from_pg(&row)?.into_record()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: &ProductId) -> Result<(), OverlayStoreError> {
        let deleted = sqlx::query("DELETE FROM premium_products WHERE id = $1 RETURNING id")
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(OverlayStoreError::NotFound(id.clone())),
        }
    }
}

// SQLx row types

#[derive(Debug)]
struct PremiumRow {
    id: String,
    image: String,
    title: String,
    price: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for PremiumRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(PremiumRow {
            id: row.try_get("id")?,
            image: row.try_get("image")?,
            title: row.try_get("title")?,
            price: row.try_get("price")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl PremiumRow {
    fn from_pg(row: &sqlx::postgres::PgRow) -> Result<Self, OverlayStoreError> {
        <Self as sqlx::FromRow<'_, sqlx::postgres::PgRow>>::from_row(row)
            .map_err(|e| OverlayStoreError::Storage(format!("failed to decode premium row: {e}")))
    }

    fn into_record(self) -> Result<PremiumRecord, OverlayStoreError> {
        let id = parse_id(self.id)?;
        let attributes = PremiumAttributes::new(self.image, self.title, self.price)
            .map_err(|e| OverlayStoreError::Storage(format!("corrupt premium row {id}: {e}")))?;
        Ok(PremiumRecord {
            id,
            attributes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_id(raw: String) -> Result<ProductId, OverlayStoreError> {
    ProductId::new(raw).map_err(|e| OverlayStoreError::Storage(format!("corrupt premium row: {e}")))
}

/// Map SQLx errors to overlay store errors, keeping the operation name.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> OverlayStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
            OverlayStoreError::Storage(format!(
                "database error in {} (code {}): {}",
                operation,
                code,
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            OverlayStoreError::Storage(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            OverlayStoreError::Storage(format!("connection pool timed out in {}", operation))
        }
        _ => OverlayStoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}
