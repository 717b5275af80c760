//! A personal finance ledger: income and expense transactions and the user profiles that keep
//! them, stored as JSON files in a ledger home directory.

pub mod accounts;
pub mod args;
pub mod commands;
mod config;
mod error;
mod export;
pub mod model;
pub mod store;
mod utils;


pub use config::Config;
pub use error::{error_type, Error, ErrorType, Result};
