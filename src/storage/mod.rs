mod repository;
mod session;
mod store;

pub use repository::*;
pub use session::*;
pub use store::*;

/// SQL migration for the account and balance tables
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");
