//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const SELECT_COLUMNS: &str = "code, target_url, created_at, expires_at, click_count, \
     last_accessed_at, is_custom, created_by";

/// Upper bound on rows returned by the reporting queries.
const REPORT_LIMIT: i64 = 500;

/// PostgreSQL repository for short link records.
///
/// Uniqueness is enforced by the primary key on `code`; inserts use
/// `ON CONFLICT DO NOTHING` so a lost race is reported without a failed statement.
/// Every query is bounded by `query_timeout`.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                tracing::error!(
                    "Database {} timed out after {:?}",
                    op,
                    self.query_timeout
                );
                Err(AppError::internal(
                    "Database timeout",
                    json!({ "operation": op }),
                ))
            }
        }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn get(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM short_links WHERE code = $1");

        self.bounded(
            "get",
            sqlx::query_as::<_, ShortLink>(&sql)
                .bind(code)
                .fetch_optional(self.pool.as_ref()),
        )
        .await
    }

    async fn insert_unique(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            r#"
            INSERT INTO short_links (code, target_url, expires_at, is_custom, created_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO NOTHING
            RETURNING {SELECT_COLUMNS}
            "#
        );

        let inserted = self
            .bounded(
                "insert",
                sqlx::query_as::<_, ShortLink>(&sql)
                    .bind(&new_link.code)
                    .bind(&new_link.target_url)
                    .bind(new_link.expires_at)
                    .bind(new_link.is_custom)
                    .bind(&new_link.created_by)
                    .fetch_optional(self.pool.as_ref()),
            )
            .await?;

        inserted.ok_or_else(|| {
            AppError::already_taken(
                "Short code is already taken",
                json!({ "code": new_link.code }),
            )
        })
    }

    async fn increment_clicks(&self, code: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        self.bounded(
            "increment_clicks",
            sqlx::query(
                r#"
                UPDATE short_links
                SET click_count = click_count + 1,
                    last_accessed_at = GREATEST(COALESCE(last_accessed_at, $2), $2)
                WHERE code = $1
                "#,
            )
            .bind(code)
            .bind(at)
            .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(())
    }

    async fn find_by_target(&self, target_url: &str) -> Result<Vec<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM short_links WHERE target_url = $1 \
             ORDER BY created_at DESC LIMIT $2"
        );

        self.bounded(
            "find_by_target",
            sqlx::query_as::<_, ShortLink>(&sql)
                .bind(target_url)
                .bind(REPORT_LIMIT)
                .fetch_all(self.pool.as_ref()),
        )
        .await
    }

    async fn find_by_client(&self, client_key: &str) -> Result<Vec<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM short_links WHERE created_by = $1 \
             ORDER BY created_at DESC LIMIT $2"
        );

        self.bounded(
            "find_by_client",
            sqlx::query_as::<_, ShortLink>(&sql)
                .bind(client_key)
                .bind(REPORT_LIMIT)
                .fetch_all(self.pool.as_ref()),
        )
        .await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.bounded(
            "ping",
            sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(())
    }
}
