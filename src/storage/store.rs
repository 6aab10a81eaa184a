use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::{MIGRATION_001_INITIAL, Repository, Session};

/// Long-lived handle to the SQLite database, shared by every service call.
///
/// The pool holds a single connection so that one session at a time owns
/// the database while its transaction is open. Balance updates are a
/// read-then-write sequence and rely on this serialization.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a store over an existing connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the schema and seed the account row if missing.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Start a new session with no open transaction.
    pub fn session(&self) -> Session {
        Session::new(self.pool.clone())
    }

    /// Ledger repository bound to a fresh session.
    pub fn repository(&self) -> Repository {
        Repository::new(self.session())
    }

    /// The underlying pool, bypassing any session.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
