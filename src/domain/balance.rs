use serde::{Deserialize, Serialize};

/// Stored account value, split into a whole-unit part (`sbp`) and a
/// sub-unit part (`spf`) so that both columns are written together.
///
/// The true balance is always `integer_part + fractional_part`. Mutations go
/// through [`Balance::from_total`]; neither component is adjusted on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(rename = "sbp")]
    pub integer_part: f64,
    #[serde(rename = "spf")]
    pub fractional_part: f64,
}

impl Balance {
    /// Split a combined value into `(floor(total), total - floor(total))`.
    pub fn from_total(total: f64) -> Self {
        let integer_part = total.floor();
        Self {
            integer_part,
            fractional_part: total - integer_part,
        }
    }

    /// Combined value of both components.
    pub fn total(&self) -> f64 {
        self.integer_part + self.fractional_part
    }

    /// Return a new balance with `amount` added to the combined value.
    pub fn credit(&self, amount: f64) -> Self {
        Self::from_total(self.total() + amount)
    }

    /// Return a new balance with `amount` subtracted from the combined value.
    pub fn debit(&self, amount: f64) -> Self {
        Self::from_total(self.total() - amount)
    }

    /// Apply a percentage increase to the combined value.
    pub fn accrue(&self, percent: f64) -> Self {
        let total = self.total();
        Self::from_total(total + total * percent / 100.0)
    }

    /// Largest amount that may be withdrawn in one operation.
    pub fn withdrawal_limit(&self, max_percent: f64) -> f64 {
        self.total() * max_percent / 100.0
    }
}
