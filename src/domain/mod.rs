mod account;
mod balance;
mod currency;
mod money;

pub use account::*;
pub use balance::*;
pub use currency::*;
pub use money::*;
