pub mod application;
pub mod cli;
pub mod domain;
pub mod http;
pub mod logging;
pub mod storage;

pub use domain::*;
pub use storage::{Repository, Session, Store};
