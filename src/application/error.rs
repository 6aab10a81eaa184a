use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("there are not enough funds in your account: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: f64, requested: f64 },

    #[error("the amount exceeds the bank limit: limit {limit}, requested {requested}")]
    WithdrawalLimitExceeded { limit: f64, requested: f64 },

    #[error("the bank does not support the specified currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Database error: {0:#}")]
    Store(#[from] anyhow::Error),
}
