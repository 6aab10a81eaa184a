use anyhow::{Context, Result};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteQueryResult, SqliteRow, SqliteStatement};
use sqlx::{Executor, Sqlite, SqlitePool, Transaction};

/// Nesting depth of the outermost `begin`.
const BASE_DEPTH: i32 = 1;

/// A per-call unit of work over the store with re-entrant transactions.
///
/// Any number of call sites may `begin` and `commit` on the same session;
/// only one database transaction is open at a time and only the outermost
/// `commit` actually commits it. `rollback` is meant to run on every exit
/// path after `begin`: it is a no-op once a `commit` has disarmed it.
///
/// Rollback is always global. An inner `begin`/`commit` pair only defers the
/// commit; a later armed `rollback` discards everything written since the
/// outermost `begin`, whatever the depth.
///
/// Statements issued through the session run inside the open transaction
/// when there is one and directly against the pool otherwise. Dropping a
/// session with an open transaction rolls it back.
pub struct Session {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    depth: i32,
    rollback_armed: bool,
}

impl Session {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            tx: None,
            depth: 0,
            rollback_armed: false,
        }
    }

    /// Open a transaction, or re-enter the one already open.
    pub async fn begin(&mut self) -> Result<()> {
        self.rollback_armed = true;
        if self.tx.is_some() {
            self.depth += 1;
            tracing::debug!(depth = self.depth, "re-entered transaction");
            return Ok(());
        }

        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        self.tx = Some(tx);
        self.depth = BASE_DEPTH;
        tracing::debug!("transaction opened");
        Ok(())
    }

    /// Disarm the pending rollback and commit if this closes the outermost scope.
    ///
    /// A failed commit consumes the transaction handle; the error is returned
    /// and not retried.
    pub async fn commit(&mut self) -> Result<()> {
        self.rollback_armed = false;
        if self.tx.is_none() {
            return Ok(());
        }

        if self.depth > BASE_DEPTH {
            self.depth -= 1;
            tracing::debug!(depth = self.depth, "deferred commit to outer scope");
            return Ok(());
        }

        if let Some(tx) = self.tx.take() {
            self.depth = 0;
            tx.commit().await.context("Failed to commit transaction")?;
            tracing::debug!("transaction committed");
        }
        Ok(())
    }

    /// Roll back the whole transaction if one is open and still armed.
    pub async fn rollback(&mut self) -> Result<()> {
        if !self.rollback_armed {
            return Ok(());
        }

        if let Some(tx) = self.tx.take() {
            self.depth = 0;
            self.rollback_armed = false;
            tx.rollback()
                .await
                .context("Failed to roll back transaction")?;
            tracing::debug!("transaction rolled back");
        }
        Ok(())
    }

    /// Whether a database transaction is currently open.
    pub fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    /// Number of `begin` calls not yet matched by a `commit`.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Whether the next `rollback` will take effect.
    pub fn is_rollback_armed(&self) -> bool {
        self.rollback_armed
    }

    /// Execute a statement that returns no rows.
    pub async fn execute<'q>(
        &mut self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<SqliteQueryResult, sqlx::Error> {
        match self.tx.as_mut() {
            Some(tx) => query.execute(&mut **tx).await,
            None => query.execute(&self.pool).await,
        }
    }

    /// Fetch every row produced by a query.
    pub async fn fetch_all<'q>(
        &mut self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<Vec<SqliteRow>, sqlx::Error> {
        match self.tx.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await,
            None => query.fetch_all(&self.pool).await,
        }
    }

    /// Fetch at most one row.
    pub async fn fetch_optional<'q>(
        &mut self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<Option<SqliteRow>, sqlx::Error> {
        match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await,
            None => query.fetch_optional(&self.pool).await,
        }
    }

    /// Prepare a statement on the connection the session is bound to.
    pub async fn prepare<'q>(&mut self, sql: &'q str) -> Result<SqliteStatement<'q>, sqlx::Error> {
        match self.tx.as_mut() {
            Some(tx) => (&mut **tx).prepare(sql).await,
            None => (&self.pool).prepare(sql).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Store;
    use sqlx::{Row, Statement};
    use tempfile::TempDir;

    async fn test_store() -> Result<(Store, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("session.db");
        let store = Store::init(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;
        Ok((store, temp_dir))
    }

    async fn set_sbp(session: &mut Session, value: f64) -> Result<()> {
        session
            .execute(sqlx::query("UPDATE balance SET sbp = ? WHERE id = 1").bind(value))
            .await?;
        Ok(())
    }

    async fn sbp(session: &mut Session) -> Result<f64> {
        let row = session
            .fetch_optional(sqlx::query("SELECT sbp FROM balance WHERE id = 1"))
            .await?
            .context("balance row missing")?;
        Ok(row.get("sbp"))
    }

    #[tokio::test]
    async fn test_begin_opens_once_and_counts_depth() -> Result<()> {
        let (store, _temp) = test_store().await?;
        let mut session = store.session();
        assert!(!session.is_active());

        session.begin().await?;
        assert!(session.is_active());
        assert_eq!(session.depth(), 1);
        assert!(session.is_rollback_armed());

        session.begin().await?;
        assert_eq!(session.depth(), 2);

        session.commit().await?;
        assert!(session.is_active(), "inner commit must not close the transaction");
        assert_eq!(session.depth(), 1);

        session.begin().await?;
        session.commit().await?;
        session.commit().await?;
        assert!(!session.is_active());
        Ok(())
    }

    #[tokio::test]
    async fn test_outermost_commit_persists_nested_work() -> Result<()> {
        let (store, _temp) = test_store().await?;
        let mut session = store.session();

        session.begin().await?;
        session.begin().await?;
        set_sbp(&mut session, 42.0).await?;
        session.commit().await?;
        session.commit().await?;
        session.rollback().await?;

        assert_eq!(sbp(&mut store.session()).await?, 42.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_after_commit_is_noop() -> Result<()> {
        let (store, _temp) = test_store().await?;
        let mut session = store.session();

        session.begin().await?;
        set_sbp(&mut session, 7.0).await?;
        session.commit().await?;
        assert!(!session.is_rollback_armed());
        session.rollback().await?;

        assert_eq!(sbp(&mut session).await?, 7.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_armed_rollback_discards_all_nested_work() -> Result<()> {
        let (store, _temp) = test_store().await?;
        let mut session = store.session();

        session.begin().await?;
        set_sbp(&mut session, 1.0).await?;
        session.begin().await?;
        set_sbp(&mut session, 2.0).await?;
        session.commit().await?;

        // Outer scope re-arms and then fails.
        session.begin().await?;
        session.rollback().await?;
        assert!(!session.is_active());
        assert_eq!(session.depth(), 0);

        assert_eq!(sbp(&mut session).await?, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_without_transaction_is_noop() -> Result<()> {
        let (store, _temp) = test_store().await?;
        let mut session = store.session();
        session.rollback().await?;
        session.commit().await?;
        assert!(!session.is_active());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_commit_drops_handle_and_keeps_store_unchanged() -> Result<()> {
        let (store, _temp) = test_store().await?;
        let mut session = store.session();

        session.begin().await?;
        session
            .execute(sqlx::query("PRAGMA defer_foreign_keys = ON"))
            .await?;
        set_sbp(&mut session, 5.0).await?;
        session
            .execute(sqlx::query("UPDATE account SET balanceId = 999"))
            .await?;

        assert!(session.commit().await.is_err());
        assert!(!session.is_active());
        assert_eq!(session.depth(), 0);
        drop(session);

        let mut fresh = store.session();
        assert_eq!(sbp(&mut fresh).await?, 0.0);
        let row = fresh
            .fetch_optional(sqlx::query("SELECT balanceId FROM account"))
            .await?
            .context("account row missing")?;
        assert_eq!(row.get::<i64, _>("balanceId"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_dropped_session_rolls_back() -> Result<()> {
        let (store, _temp) = test_store().await?;
        {
            let mut session = store.session();
            session.begin().await?;
            set_sbp(&mut session, 99.0).await?;
        }
        assert_eq!(sbp(&mut store.session()).await?, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_statements_route_through_open_transaction() -> Result<()> {
        let (store, _temp) = test_store().await?;
        let mut session = store.session();

        session.begin().await?;
        set_sbp(&mut session, 5.0).await?;
        let statement = session.prepare("SELECT sbp FROM balance").await?;
        let rows = session.fetch_all(statement.query()).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<f64, _>("sbp"), 5.0);
        session.rollback().await?;

        let rows = session.fetch_all(sqlx::query("SELECT sbp FROM balance")).await?;
        assert_eq!(rows[0].get::<f64, _>("sbp"), 0.0);
        Ok(())
    }
}
