use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::core::InterestTransition;
use crate::services::ledger::{InterestLedger, LedgerError};

/// PostgreSQL-backed interest ledger
///
/// Holds the authoritative interest counter of every session next to the
/// per-identity markers, so each toggle is a single transaction.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, LedgerError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Read-modify-write of one marker and its counter
    ///
    /// The counter row is created on first use and locked with
    /// `SELECT ... FOR UPDATE`, which serializes concurrent writers on the
    /// same session.
    async fn apply(
        &self,
        session_id: &str,
        user_id: &str,
        want: Option<bool>,
    ) -> Result<InterestTransition, LedgerError> {
        if session_id.is_empty() || user_id.is_empty() {
            return Err(LedgerError::InvalidInput("session and user ids are required".into()));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO session_interest_counts (session_id, interested_count)
            VALUES ($1, 0)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT interested_count
            FROM session_interest_counts
            WHERE session_id = $1
            FOR UPDATE
            "#,
        )
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        let was_interested: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM session_interests
                WHERE session_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let current = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
        let transition = match want {
            Some(value) => InterestTransition::set(current, was_interested, value),
            None => InterestTransition::toggle(current, was_interested),
        };

        if transition.changed {
            let marker_query = if transition.interested {
                r#"
                INSERT INTO session_interests (session_id, user_id, created_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (session_id, user_id) DO NOTHING
                "#
            } else {
                r#"
                DELETE FROM session_interests
                WHERE session_id = $1 AND user_id = $2
                "#
            };

            sqlx::query(marker_query)
                .bind(session_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                UPDATE session_interest_counts
                SET interested_count = $2, updated_at = NOW()
                WHERE session_id = $1
                "#,
            )
            .bind(session_id)
            .bind(i64::from(transition.count))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Interest {} -> {} (interested: {}, count: {})",
            user_id,
            session_id,
            transition.interested,
            transition.count
        );

        Ok(transition)
    }
}

#[async_trait]
impl InterestLedger for PostgresClient {
    async fn toggle_interest(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<InterestTransition, LedgerError> {
        self.apply(session_id, user_id, None).await
    }

    async fn set_interest(
        &self,
        session_id: &str,
        user_id: &str,
        interested: bool,
    ) -> Result<InterestTransition, LedgerError> {
        self.apply(session_id, user_id, Some(interested)).await
    }

    async fn is_interested(&self, session_id: &str, user_id: &str) -> Result<bool, LedgerError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM session_interests
                WHERE session_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn interest_counts(
        &self,
        session_ids: &[String],
    ) -> Result<HashMap<String, u32>, LedgerError> {
        if session_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT session_id, interested_count
            FROM session_interest_counts
            WHERE session_id = ANY($1)
            "#,
        )
        .bind(session_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let count: i64 = row.get("interested_count");
                (
                    row.get::<String, _>("session_id"),
                    u32::try_from(count.max(0)).unwrap_or(u32::MAX),
                )
            })
            .collect())
    }

    async fn my_interests(
        &self,
        user_id: &str,
        session_ids: &[String],
    ) -> Result<HashSet<String>, LedgerError> {
        if session_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT session_id
            FROM session_interests
            WHERE user_id = $1 AND session_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(session_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("session_id")).collect())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, LedgerError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
