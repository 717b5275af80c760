//! Flat-file stores. Each store owns an in-memory collection and rewrites its whole backing file
//! on every mutation. They assume a single writer.

mod profiles;
mod transactions;

pub use profiles::{Contact, ProfileStore};
pub use transactions::{Filtered, Query, TransactionStore};
