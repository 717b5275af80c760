//! Add command handler and the field checks shared with `update`.

use crate::args::AddArgs;
use crate::commands::{money, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{parse_date, today, Amount, Transaction, DATE_FORMAT};
use crate::{Config, Result};
use anyhow::anyhow;

/// The largest amount a single transaction may record.
const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Records a new transaction with the next free ID and saves the transactions file.
///
/// # Arguments
///
/// - `config` - The application configuration.
/// - `args` - The transaction data. The description must not be empty, the amount must be
///   greater than zero and at most 10^15, and the date, if given, must be `YYYY-MM-DD`. The date defaults to today
///   and the category to "Other".
///
/// # Returns
///
/// On success, returns an `Out` containing the stored transaction.
///
/// # Errors
///
/// - Returns an `ErrorType::Validation` error if a field is rejected.
/// - Returns an `ErrorType::Io` error if the transactions file cannot be written.
pub fn add(config: &Config, args: AddArgs) -> Result<Out<Transaction>> {
    let description = check_description(&args.description)?;
    check_amount(args.amount)?;
    let date = match args.date.as_deref() {
        Some(date) => check_date(date)?,
        None => today().format(DATE_FORMAT).to_string(),
    };

    let mut store = config.transaction_store();
    let transaction = Transaction::new(
        store.next_id(),
        args.kind,
        &date,
        description,
        args.amount,
        args.category.as_deref().unwrap_or_default().trim(),
    );
    store.add(transaction.clone())?;

    let message = format!(
        "Added {} #{}: {} {}",
        transaction.display_label().to_lowercase(),
        transaction.id(),
        transaction.description(),
        money(transaction.amount(), config.currency())
    );
    Ok(Out::new(message, transaction))
}

pub(super) fn check_description(description: &str) -> Result<String> {
    let description = description.trim();
    ensure_valid(!description.is_empty(), "Description must not be empty")?;
    Ok(description.to_string())
}

pub(super) fn check_amount(amount: Amount) -> Result<()> {
    ensure_valid(amount.is_positive(), "Amount must be greater than zero")?;
    ensure_valid(
        amount <= Amount::from(MAX_AMOUNT),
        "Amount must not exceed 1,000,000,000,000,000",
    )
}

/// Returns the date in canonical form, or a validation error if it is not `YYYY-MM-DD`.
pub(super) fn check_date(date: &str) -> Result<String> {
    let date = parse_date(date).pub_result(ErrorType::Validation)?;
    Ok(date.format(DATE_FORMAT).to_string())
}

fn ensure_valid(condition: bool, message: &str) -> Result<()> {
    if condition {
        return Ok(());
    }
    Err(anyhow!("{message}")).pub_result(ErrorType::Validation)
}
