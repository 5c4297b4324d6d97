// SPDX-License-Identifier: MIT

//! SQLite lead store

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::{LeadRecord, LeadStore, NewLead};
use crate::llm::error::Result;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:leads.db?mode=rwc";

/// SQLite-backed [`LeadStore`]
#[derive(Clone)]
pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    /// Connect and create the `leads` table if needed.
    ///
    /// # Example URLs
    /// - `sqlite:leads.db?mode=rwc` - file database, created if missing
    /// - `sqlite::memory:` - in-memory database (see [`Self::in_memory`])
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.init().await?;
        log::info!("Lead store ready at {}", database_url);
        Ok(store)
    }

    /// In-memory store. A single connection, since every SQLite memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS leads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                message TEXT NOT NULL,
                company_title TEXT,
                classification TEXT NOT NULL,
                score INTEGER,
                drafted_reply TEXT,
                timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn add_lead(&self, lead: &NewLead) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO leads (name, email, message, company_title, classification, score, drafted_reply)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.message)
        .bind(&lead.company_title)
        .bind(&lead.classification)
        .bind(lead.score)
        .bind(&lead.drafted_reply)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Database error while adding lead '{}': {}", lead.name, e);
            e
        })?;

        let id = result.last_insert_rowid();
        log::info!("Lead '{}' was added to the database (id {})", lead.name, id);
        Ok(id)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<LeadRecord>> {
        let rows = sqlx::query_as::<_, LeadRecord>(
            r#"
            SELECT id, name, email, message, company_title, classification, score, drafted_reply, timestamp
            FROM leads
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
