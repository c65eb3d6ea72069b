//! PostgreSQL implementation of the URL record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{StorageError, UrlRepository};
use crate::utils::db_error::map_sqlx_error;

/// Row shape of the `urls` table.
#[derive(Debug, FromRow)]
struct UrlRow {
    id: i64,
    original_url: String,
    short_alias: String,
    clicks: i64,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord::new(
            row.id,
            row.original_url,
            row.short_alias,
            row.clicks,
            row.created_at,
        )
    }
}

/// PostgreSQL repository for URL records.
///
/// Uniqueness of `short_alias` and `original_url` is enforced by the
/// `urls_short_alias_key` and `urls_original_url_key` constraints.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64, StorageError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, StorageError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (original_url, short_alias)
            VALUES ($1, $2)
            RETURNING id, original_url, short_alias, clicks, created_at
            "#,
        )
        .bind(&new_record.original_url)
        .bind(&new_record.short_alias)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlRecord>, StorageError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_alias, clicks, created_at
            FROM urls
            WHERE short_alias = $1
            "#,
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<UrlRecord>, StorageError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_alias, clicks, created_at
            FROM urls
            WHERE original_url = $1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_all(&self) -> Result<Vec<UrlRecord>, StorageError> {
        let rows = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_alias, clicks, created_at
            FROM urls
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn delete_by_alias(&self, alias: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM urls WHERE short_alias = $1")
            .bind(alias)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
