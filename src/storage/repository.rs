use anyhow::{Context, Result};
use sqlx::{Row, Statement};

use crate::domain::{Account, Balance};

use super::Session;

const SELECT_BALANCE: &str = r#"
    SELECT balance.sbp AS sbp, balance.spf AS spf
    FROM account
    LEFT JOIN balance ON account.balanceId = balance.id
    LIMIT 1
"#;

const SELECT_BALANCE_ID: &str = "SELECT balanceId FROM account LIMIT 1";

const UPDATE_BALANCE: &str = "UPDATE balance SET sbp = ?, spf = ? WHERE id = ?";

const SELECT_CURRENCY: &str = "SELECT currency FROM account LIMIT 1";

/// Reads and writes the account balance through a [`Session`].
///
/// Every statement goes through the session, so the same code runs inside
/// or outside an open transaction.
pub struct Repository {
    session: Session,
}

impl Repository {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// The session used for every statement of this repository.
    pub fn session(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Read the stored balance.
    ///
    /// A missing row yields a zero balance rather than an error, which cannot
    /// be told apart from a real zero balance.
    pub async fn read_balance(&mut self) -> Result<Balance> {
        let row = self
            .session
            .fetch_optional(sqlx::query(SELECT_BALANCE))
            .await
            .context("Failed to read balance")?;

        match row {
            Some(row) => Ok(Balance {
                integer_part: row
                    .try_get::<Option<f64>, _>("sbp")
                    .context("Invalid sbp value")?
                    .unwrap_or_default(),
                fractional_part: row
                    .try_get::<Option<f64>, _>("spf")
                    .context("Invalid spf value")?
                    .unwrap_or_default(),
            }),
            None => Ok(Balance::default()),
        }
    }

    /// Overwrite the balance row referenced by the account.
    ///
    /// Looks up the balance id and then updates it in a second statement;
    /// the pair is only atomic inside the caller's transaction.
    pub async fn write_balance(&mut self, balance: Balance) -> Result<()> {
        let row = self
            .session
            .fetch_optional(sqlx::query(SELECT_BALANCE_ID))
            .await
            .context("Failed to look up balance id")?;
        let balance_id: i64 = match row {
            Some(row) => row.try_get("balanceId").context("Invalid balance id")?,
            None => 0,
        };

        self.session
            .execute(
                sqlx::query(UPDATE_BALANCE)
                    .bind(balance.integer_part)
                    .bind(balance.fractional_part)
                    .bind(balance_id),
            )
            .await
            .context("Failed to update balance")?;

        tracing::debug!(
            balance_id,
            sbp = balance.integer_part,
            spf = balance.fractional_part,
            "balance written"
        );
        Ok(())
    }

    /// Read the account currency code, or an empty string when no account exists.
    pub async fn read_currency(&mut self) -> Result<String> {
        let statement = self
            .session
            .prepare(SELECT_CURRENCY)
            .await
            .context("Failed to prepare currency query")?;
        let row = self
            .session
            .fetch_optional(statement.query())
            .await
            .context("Failed to read currency")?;

        match row {
            Some(row) => Ok(row.try_get("currency").context("Invalid currency value")?),
            None => Ok(String::new()),
        }
    }

    /// Read the full account row with its balance.
    pub async fn read_account(&mut self) -> Result<Option<Account>> {
        let row = self
            .session
            .fetch_optional(sqlx::query(
                r#"
                SELECT account.id AS id, account.currency AS currency,
                       balance.sbp AS sbp, balance.spf AS spf
                FROM account
                LEFT JOIN balance ON account.balanceId = balance.id
                LIMIT 1
                "#,
            ))
            .await
            .context("Failed to read account")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let sbp: Option<f64> = row.try_get("sbp").context("Invalid sbp value")?;
        let spf: Option<f64> = row.try_get("spf").context("Invalid spf value")?;

        Ok(Account {
            id: row.try_get("id").context("Invalid account id")?,
            balance: Balance {
                integer_part: sbp.unwrap_or_default(),
                fractional_part: spf.unwrap_or_default(),
            },
            currency: row.try_get("currency").context("Invalid currency value")?,
        })
    }
}
