use crate::args::UpdateArgs;
use crate::commands::insert::{check_amount, check_date, check_description};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::{Config, Result};
use anyhow::anyhow;

/// Changes the given fields of transaction `args.id` and saves the transactions file. Fields
/// that are `None` keep their current values; the ID never changes.
///
/// # Errors
///
/// - Returns an `ErrorType::NotFound` error if no transaction has the ID.
/// - Returns an `ErrorType::Validation` error if a given field is rejected, with the same rules
///   as `add`.
pub fn update(config: &Config, args: UpdateArgs) -> Result<Out<Transaction>> {
    let mut store = config.transaction_store();
    let mut transaction = store
        .get_by_id(args.id)
        .cloned()
        .ok_or_else(|| anyhow!("Transaction {} not found", args.id))
        .pub_result(ErrorType::NotFound)?;

    if let Some(kind) = args.kind {
        transaction.set_kind(kind);
    }
    if let Some(description) = args.description.as_deref() {
        transaction.set_description(check_description(description)?);
    }
    if let Some(amount) = args.amount {
        check_amount(amount)?;
        transaction.set_amount(amount);
    }
    if let Some(date) = args.date.as_deref() {
        transaction.set_date(&check_date(date)?);
    }
    if let Some(category) = args.category.as_deref() {
        transaction.set_category(category.trim());
    }

    store.update(transaction.clone())?;
    Ok(Out::new(
        format!("Updated transaction {}", transaction.id()),
        transaction,
    ))
}
