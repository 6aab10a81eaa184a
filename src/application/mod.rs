// Application layer - business rules over the account ledger.
// Every mutation runs inside a session transaction opened here.

pub mod config;
pub mod error;
pub mod service;

pub use config::*;
pub use error::*;
pub use service::*;
