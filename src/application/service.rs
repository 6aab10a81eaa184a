use crate::domain::{Account, Currency, round_balance};
use crate::storage::{Repository, Store};

use super::{AppError, LedgerConfig};

/// Application service providing the account operations.
/// This is the primary interface for any client (HTTP, CLI).
///
/// Each call works on its own session. Mutations follow the same shape:
/// `begin`, read, validate, write, `commit`, and an unconditional `rollback`
/// afterwards that only takes effect if the commit was never reached.
pub struct LedgerService {
    store: Store,
    config: LedgerConfig,
}

impl LedgerService {
    /// Create a new ledger service over the given store.
    pub fn new(store: Store, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str, config: LedgerConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = Store::init(&db_url).await?;
        Ok(Self::new(store, config))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str, config: LedgerConfig) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = Store::connect(&db_url).await?;
        Ok(Self::new(store, config))
    }

    /// The store every call opens its session on.
    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================
    // Mutations
    // ========================

    /// Deposit `amount` native units and credit the profit accrual.
    pub async fn add_funds(&self, amount: f64) -> Result<(), AppError> {
        if amount == 0.0 {
            return Ok(());
        }

        let mut repo = self.store.repository();
        repo.session().begin().await?;
        let outcome = self.deposit(&mut repo, amount).await;
        Self::release(&mut repo, outcome).await?;

        tracing::info!(amount, "funds added");
        Ok(())
    }

    async fn deposit(&self, repo: &mut Repository, amount: f64) -> Result<(), AppError> {
        let balance = repo.read_balance().await?;
        repo.write_balance(balance.credit(amount)).await?;
        self.accrue_profit(repo).await?;
        repo.session().commit().await?;
        Ok(())
    }

    /// Credit `add_percent` of the current balance.
    ///
    /// Runs as a nested scope of the caller's transaction: its commit only
    /// hands control back to the outer scope.
    async fn accrue_profit(&self, repo: &mut Repository) -> Result<(), AppError> {
        repo.session().begin().await?;
        let balance = repo.read_balance().await?;
        let accrued = balance.accrue(self.config.add_percent);
        repo.write_balance(accrued).await?;
        repo.session().commit().await?;

        tracing::debug!(
            percent = self.config.add_percent,
            balance = accrued.total(),
            "profit accrued"
        );
        Ok(())
    }

    /// Withdraw `amount` native units.
    ///
    /// Fails with [`AppError::InsufficientFunds`] when the amount exceeds the
    /// balance, and with [`AppError::WithdrawalLimitExceeded`] when it exceeds
    /// `max_percent` of the balance. Nothing is written in either case.
    pub async fn withdraw(&self, amount: f64) -> Result<(), AppError> {
        if amount == 0.0 {
            return Ok(());
        }

        let mut repo = self.store.repository();
        repo.session().begin().await?;
        let outcome = self.debit(&mut repo, amount).await;
        Self::release(&mut repo, outcome).await?;

        tracing::info!(amount, "funds withdrawn");
        Ok(())
    }

    async fn debit(&self, repo: &mut Repository, amount: f64) -> Result<(), AppError> {
        let balance = repo.read_balance().await?;
        let total = balance.total();
        if total < amount {
            return Err(AppError::InsufficientFunds {
                balance: total,
                requested: amount,
            });
        }

        let limit = balance.withdrawal_limit(self.config.max_percent);
        if amount > limit {
            return Err(AppError::WithdrawalLimitExceeded {
                limit,
                requested: amount,
            });
        }

        repo.write_balance(balance.debit(amount)).await?;
        repo.session().commit().await?;
        Ok(())
    }

    /// Run the deferred rollback and hand back the operation's own result.
    ///
    /// The rollback is a no-op after a successful commit. Its failure is
    /// logged; it never replaces the outcome.
    async fn release<T>(
        repo: &mut Repository,
        outcome: Result<T, AppError>,
    ) -> Result<T, AppError> {
        if let Err(err) = repo.session().rollback().await {
            tracing::warn!(error = %err, "cleanup rollback failed");
        }
        if let Err(err) = &outcome {
            tracing::debug!(error = %err, "ledger operation aborted");
        }
        outcome
    }

    // ========================
    // Queries
    // ========================

    /// Balance in the requested currency, rounded to two places.
    ///
    /// An empty code means the native currency.
    pub async fn get_balance(&self, currency: &str) -> Result<f64, AppError> {
        let currency = if currency.is_empty() {
            Currency::Sbp.as_str()
        } else {
            currency
        };
        let target = Currency::from_str(currency)
            .ok_or_else(|| AppError::UnsupportedCurrency(currency.to_string()))?;

        let balance = self.store.repository().read_balance().await?;
        let converted = balance.total() * Currency::Sbp.rate_to(target);
        Ok(round_balance(converted))
    }

    /// The account's stored currency code.
    pub async fn get_currency(&self) -> Result<String, AppError> {
        Ok(self.store.repository().read_currency().await?)
    }

    /// Rate that converts the account's currency into `target`.
    pub async fn get_account_currency_rate(&self, target: &str) -> Result<f64, AppError> {
        let native = self.get_currency().await?;
        if target == native {
            return Ok(1.0);
        }

        match (Currency::from_str(&native), Currency::from_str(target)) {
            (Some(from), Some(to)) => Ok(from.rate_to(to)),
            _ => Err(AppError::UnsupportedCurrency(target.to_string())),
        }
    }

    /// The account row with its balance, if the account exists.
    pub async fn get_account(&self) -> Result<Option<Account>, AppError> {
        Ok(self.store.repository().read_account().await?)
    }
}
