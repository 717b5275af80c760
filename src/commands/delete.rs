use crate::commands::Out;
use crate::{Config, Result};

/// Deletes every transaction with `id` and saves the transactions file.
///
/// # Errors
///
/// - Returns an `ErrorType::NotFound` error if no transaction has the ID.
pub fn delete(config: &Config, id: u64) -> Result<Out<u64>> {
    let mut store = config.transaction_store();
    store.delete(id)?;
    Ok(Out::new(format!("Deleted transaction {id}"), id))
}
