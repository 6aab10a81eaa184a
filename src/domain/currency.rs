use serde::{Deserialize, Serialize};

/// Fixed exchange rate: one SBP is worth this many RUB.
pub const SBP_TO_RUB: f64 = 0.7523;

/// Currencies the bank understands. SBP is the native unit that balances
/// are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Sbp,
    Rub,
}

impl Currency {
    /// Code as stored in the account row.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Sbp => "SBP",
            Currency::Rub => "RUB",
        }
    }

    /// Parse an exact currency code. Codes are case-sensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SBP" => Some(Currency::Sbp),
            "RUB" => Some(Currency::Rub),
            _ => None,
        }
    }

    /// Rate that converts an amount in `self` into `target`.
    pub fn rate_to(&self, target: Currency) -> f64 {
        match (self, target) {
            (Currency::Sbp, Currency::Rub) => SBP_TO_RUB,
            (Currency::Rub, Currency::Sbp) => 1.0 / SBP_TO_RUB,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Convert an incoming amount to native SBP units.
///
/// Amounts labelled RUB are divided by the SBP→RUB rate; any other label,
/// including an empty or unknown one, is taken as already native.
pub fn convert_to_native(amount: f64, currency: &str) -> f64 {
    match Currency::from_str(currency) {
        Some(Currency::Rub) => amount / SBP_TO_RUB,
        _ => amount,
    }
}
