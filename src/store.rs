//! Watchlist store: maps a consumer identity to its subscribed symbols.
//! Plain sqlite CRUD; the alerting core only reads it through
//! `symbols_for`.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use crate::universe::Symbol;

pub struct WatchStore {
    pool: SqlitePool,
}

impl WatchStore {
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to watchlist store");

        let connect_options = SqliteConnectOptions::from_str(url)
            .context("Failed to parse WATCH_STORE_URL")?
            .create_if_missing(true);

        // One pooled connection: sqlite serializes writers anyway, and
        // in-memory databases exist per connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect_with(connect_options)
            .await
            .context("Failed to connect to watchlist store")?;

        let store = WatchStore { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS watches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                consumer TEXT NOT NULL,
                symbol TEXT NOT NULL,
                UNIQUE (consumer, symbol)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create watches table")?;
        Ok(())
    }

    /// Perform a health check on the store connection
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Watchlist store health check failed")?;
        Ok(())
    }

    /// Subscribe a consumer to a symbol. Returns false when the pair
    /// already exists.
    pub async fn add(&self, consumer: &str, symbol: &Symbol) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO watches (consumer, symbol) VALUES (?1, ?2)",
        )
        .bind(consumer)
        .bind(symbol.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to add watch")?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a consumer's subscription. Returns false when it was absent.
    pub async fn remove(&self, consumer: &str, symbol: &Symbol) -> Result<bool> {
        let result = sqlx::query("DELETE FROM watches WHERE consumer = ?1 AND symbol = ?2")
            .bind(consumer)
            .bind(symbol.as_str())
            .execute(&self.pool)
            .await
            .context("Failed to remove watch")?;
        Ok(result.rows_affected() > 0)
    }

    /// Symbols the consumer is subscribed to, in insertion order.
    pub async fn symbols_for(&self, consumer: &str) -> Result<Vec<Symbol>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT symbol FROM watches WHERE consumer = ?1 ORDER BY id")
                .bind(consumer)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list watches")?;
        Ok(rows.into_iter().map(|(s,)| Symbol::new(&s)).collect())
    }
}
