// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use sbp_ledger::Balance;
use sbp_ledger::application::{LedgerConfig, LedgerService};
use sqlx::Row;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap(), LedgerConfig::default()).await?;
    Ok((service, temp_dir))
}

/// Overwrite the stored balance without going through the business rules.
pub async fn set_balance(service: &LedgerService, total: f64) -> Result<()> {
    let balance = Balance::from_total(total);
    sqlx::query("UPDATE balance SET sbp = ?, spf = ? WHERE id = 1")
        .bind(balance.integer_part)
        .bind(balance.fractional_part)
        .execute(service.store().pool())
        .await?;
    Ok(())
}

/// Read the combined stored balance directly from the table.
pub async fn stored_total(service: &LedgerService) -> Result<f64> {
    let row = sqlx::query("SELECT sbp, spf FROM balance WHERE id = 1")
        .fetch_one(service.store().pool())
        .await?;
    let sbp: f64 = row.get("sbp");
    let spf: f64 = row.get("spf");
    Ok(sbp + spf)
}

/// Make every balance update whose new `sbp` satisfies `condition` fail.
pub async fn fail_balance_updates_when(service: &LedgerService, condition: &str) -> Result<()> {
    let sql = format!(
        "CREATE TRIGGER fail_balance_update BEFORE UPDATE ON balance \
         WHEN {} \
         BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;",
        condition
    );
    sqlx::query(&sql).execute(service.store().pool()).await?;
    Ok(())
}

/// Change the account's native currency code.
pub async fn set_account_currency(service: &LedgerService, currency: &str) -> Result<()> {
    sqlx::query("UPDATE account SET currency = ?")
        .bind(currency)
        .execute(service.store().pool())
        .await?;
    Ok(())
}
