use crate::errors::{AppError, ResultExt};
use crate::models::LedgerRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Maximum number of records served by the history endpoint.
pub const HISTORY_LIMIT: i64 = 10;

/// Append-only store of past decisions and their audit outcomes.
///
/// Records are never updated or deleted. Appends from concurrent requests
/// may interleave, but each row commits atomically; retrieval never mutates.
#[derive(Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    /// Opens (creating if missing) the ledger database and ensures the
    /// records table exists.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let ledger = Self { pool };
        ledger.migrate().await?;
        Ok(ledger)
    }

    /// In-memory ledger for tests. A single connection keeps every query on
    /// the same SQLite memory database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let ledger = Self { pool };
        ledger.migrate().await?;
        Ok(ledger)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS loan_records (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                applicant_income REAL NOT NULL,
                credit_score INTEGER NOT NULL,
                decision TEXT NOT NULL,
                audit_status TEXT NOT NULL,
                audit_comments TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create loan_records table")?;

        Ok(())
    }

    /// Appends one record.
    ///
    /// The orchestrator treats failures here as best-effort: they are logged
    /// and swallowed, never surfaced to the caller.
    pub async fn append(&self, record: &LedgerRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO loan_records
                (id, timestamp, applicant_income, credit_score, decision, audit_status, audit_comments)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(record.timestamp)
        .bind(record.applicant_income)
        .bind(record.credit_score)
        .bind(&record.decision)
        .bind(&record.audit_status)
        .bind(&record.audit_comments)
        .execute(&self.pool)
        .await
        .context("Failed to append loan record")?;

        tracing::debug!("Appended ledger record {}", record.id);
        Ok(())
    }

    /// Returns up to `limit` records, most recent first. An empty store
    /// yields an empty vec, not an error.
    pub async fn recent(&self, limit: i64) -> Result<Vec<LedgerRecord>, AppError> {
        let records = sqlx::query_as::<_, LedgerRecord>(
            r#"
            SELECT id, timestamp, applicant_income, credit_score, decision, audit_status, audit_comments
            FROM loan_records
            ORDER BY timestamp DESC
            LIMIT ?1
            "#,
        )
        .bind(limit.min(HISTORY_LIMIT))
        .fetch_all(&self.pool)
        .await
        .context("Failed to load loan history")?;

        Ok(records)
    }

    /// Closes the underlying pool. Subsequent appends fail and are handled
    /// as the degraded persistence path.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
