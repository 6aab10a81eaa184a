use serde::{Deserialize, Serialize};

use super::Balance;

/// The single account row together with the balance it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub balance: Balance,
    /// Native currency code. Written once at bootstrap, never updated.
    pub currency: String,
}
