/// Business-rule percentages applied by the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerConfig {
    /// Profit credited after every non-zero deposit, as a percentage of the balance.
    pub add_percent: f64,
    /// Largest share of the balance a single withdrawal may take.
    pub max_percent: f64,
}

impl LedgerConfig {
    pub const DEFAULT_ADD_PERCENT: f64 = 6.0;
    pub const DEFAULT_MAX_PERCENT: f64 = 70.0;
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            add_percent: Self::DEFAULT_ADD_PERCENT,
            max_percent: Self::DEFAULT_MAX_PERCENT,
        }
    }
}
