//! # PostgreSQL Store
//!
//! Every row lives in one `items` table keyed on `(pk, sk)`. The full
//! record is kept as JSONB in `body`; `entity_type` is lifted into its own
//! column so filtered scans run in SQL ahead of the `LIMIT`.
//!
//! Sort-key ordering uses the `"C"` collation, which orders by bytes and so
//! agrees with the in-memory backend. Scans come back in `(pk, sk)` order
//! for the same reason.

use std::time::Duration;

use async_trait::async_trait;
use ecfr_core::{ItemKey, PartitionKey, Record};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::{ItemStore, ScanFilter, StoreError};

/// [`ItemStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to `url` and apply embedded migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        tracing::info!("connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("store migrations applied");

        Ok(Self { pool })
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    pk: String,
    sk: String,
    body: serde_json::Value,
}

impl ItemRow {
    fn into_record(self) -> Result<Record, StoreError> {
        serde_json::from_value(self.body).map_err(|source| StoreError::Decode {
            key: format!("({}, {})", self.pk, self.sk),
            source,
        })
    }
}

/// Escape `LIKE` metacharacters so `prefix` matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn sql_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX))
}

#[async_trait]
impl ItemStore for PgStore {
    async fn put_item(&self, record: &Record) -> Result<(), StoreError> {
        let key = record.key();
        let body = serde_json::to_value(record).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;

        sqlx::query(
            "INSERT INTO items (pk, sk, entity_type, body, written_at)
             VALUES ($1, $2, $3, $4, now())
             ON CONFLICT (pk, sk) DO UPDATE
             SET entity_type = EXCLUDED.entity_type,
                 body = EXCLUDED.body,
                 written_at = EXCLUDED.written_at",
        )
        .bind(key.pk.as_str())
        .bind(key.sk.as_str())
        .bind(record.entity_type().as_str())
        .bind(&body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Record>, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT pk, sk, body FROM items WHERE pk = $1 AND sk = $2",
        )
        .bind(key.pk.as_str())
        .bind(key.sk.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ItemRow::into_record).transpose()
    }

    async fn query(
        &self,
        pk: &PartitionKey,
        sk_prefix: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"SELECT pk, sk, body FROM items
               WHERE pk = $1 AND sk LIKE $2 ESCAPE '\'
               ORDER BY sk COLLATE "C"
               LIMIT $3"#,
        )
        .bind(pk.as_str())
        .bind(like_prefix(sk_prefix.unwrap_or("")))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_record).collect()
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"SELECT pk, sk, body FROM items
               WHERE ($1::text IS NULL OR entity_type = $1)
                 AND ($2::text IS NULL OR pk LIKE $2 ESCAPE '\')
               ORDER BY pk COLLATE "C", sk COLLATE "C"
               LIMIT $3"#,
        )
        .bind(filter.entity_type.map(|t| t.as_str()))
        .bind(filter.pk_prefix.as_deref().map(like_prefix))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_record).collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
