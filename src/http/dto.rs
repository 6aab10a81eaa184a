use serde::{Deserialize, Serialize};

/// Envelope returned by every endpoint. `data` serializes as `null` when absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenericResponse<T> {
    pub status: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> GenericResponse<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Body of `addFund` and `withDraw`: an amount and the currency it is expressed in.
#[derive(Debug, Deserialize)]
pub struct FundRequest {
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyRequest {
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct CurrencyData {
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceData {
    pub balance: f64,
}

#[derive(Debug, Serialize)]
pub struct RateData {
    pub rate: f64,
}
