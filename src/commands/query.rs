//! Read-only commands: looking up, listing, filtering and aggregating transactions.

use crate::args::{FilterArgs, RangeArgs};
use crate::commands::{money, summary_lines, transaction_table, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{categories as category_names, Kind, Stats, Summary, Transaction};
use crate::store::Query;
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Transactions together with their totals, as shown by `list` and `search`.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Looks up one transaction.
///
/// # Errors
///
/// - Returns an `ErrorType::NotFound` error if no transaction has the ID.
pub fn show(config: &Config, id: u64) -> Result<Out<Transaction>> {
    let store = config.transaction_store();
    let transaction = store
        .get_by_id(id)
        .cloned()
        .ok_or_else(|| anyhow!("Transaction {id} not found"))
        .pub_result(ErrorType::NotFound)?;
    let message = transaction_table(&[&transaction], config.currency());
    Ok(Out::new(message.trim_end(), transaction))
}

/// All transactions, newest first, followed by the overall totals.
pub fn list(config: &Config) -> Result<Out<Listing>> {
    let store = config.transaction_store();
    let transactions = store.list();
    let summary = store.summarize(None);
    Ok(listing(config, transactions, summary, None))
}

/// The transactions matching the date range and type, newest first, followed by their totals.
/// A malformed date is reported and the dates are ignored rather than failing the command.
pub fn search(config: &Config, args: FilterArgs) -> Result<Out<Listing>> {
    let store = config.transaction_store();
    let filtered = store.filter(&query(args));
    let summary = store.summarize(Some(filtered.transactions.as_slice()));
    let mut transactions = filtered.transactions;
    transactions.sort_by(|a, b| b.date().cmp(&a.date()));
    Ok(listing(config, transactions, summary, filtered.warning))
}

/// Income, expense and balance for the transactions matching the filter.
pub fn summary(config: &Config, args: FilterArgs) -> Result<Out<Summary>> {
    let store = config.transaction_store();
    let filtered = store.filter(&query(args));
    let summary = store.summarize(Some(filtered.transactions.as_slice()));
    let mut message = String::new();
    if let Some(warning) = &filtered.warning {
        let _ = writeln!(message, "Warning: {warning}");
    }
    let _ = write!(
        message,
        "{} transactions\n{}",
        summary.count,
        summary_lines(&summary, config.currency())
    );
    Ok(Out::new(message, summary))
}

/// The largest expense categories and the income/expense split for a date range.
pub fn stats(config: &Config, args: RangeArgs) -> Result<Out<Stats>> {
    let store = config.transaction_store();
    let (stats, warning) = store.stats(args.from, args.to, config.top_categories());
    let currency = config.currency();

    let mut message = String::new();
    if let Some(warning) = &warning {
        let _ = writeln!(message, "Warning: {warning}");
    }
    if stats.expense_by_category.is_empty() {
        let _ = writeln!(message, "No expenses in this period");
    } else {
        let _ = writeln!(message, "Expenses by category:");
        let shares: BTreeMap<String, _> = stats.category_shares().into_iter().collect();
        for total in &stats.expense_by_category {
            let share = shares.get(&total.category).copied().unwrap_or_default();
            let _ = writeln!(
                message,
                "  {:<15} {:>22}  {share:>5}%",
                total.category,
                money(total.total, currency)
            );
        }
    }
    match stats.split() {
        Some((income, expense)) => {
            let _ = write!(
                message,
                "Income {} ({income}%) vs expense {} ({expense}%)",
                money(stats.total_income, currency),
                money(stats.total_expense, currency)
            );
        }
        None => {
            let _ = write!(message, "No income or expense in this period");
        }
    }
    Ok(Out::new(message, stats))
}

/// The suggested categories for one kind of transaction, or for both.
pub fn categories(kind: Option<Kind>) -> Result<Out<BTreeMap<Kind, Vec<String>>>> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => vec![Kind::Income, Kind::Expense],
    };
    let map: BTreeMap<Kind, Vec<String>> = kinds
        .into_iter()
        .map(|k| (k, category_names(k).iter().map(|c| c.to_string()).collect()))
        .collect();
    let message = map
        .iter()
        .map(|(k, names)| format!("{}: {}", k.display_label(), names.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Out::new(message, map))
}

fn query(args: FilterArgs) -> Query {
    Query::new(args.range.from, args.range.to, args.kind)
}

fn listing(
    config: &Config,
    transactions: Vec<&Transaction>,
    summary: Summary,
    warning: Option<String>,
) -> Out<Listing> {
    let mut message = String::new();
    if let Some(warning) = &warning {
        let _ = writeln!(message, "Warning: {warning}");
    }
    if transactions.is_empty() {
        let _ = writeln!(message, "No transactions");
    } else {
        message.push_str(&transaction_table(&transactions, config.currency()));
    }
    message.push_str(&summary_lines(&summary, config.currency()));
    let listing = Listing {
        transactions: transactions.into_iter().cloned().collect(),
        summary,
        warning,
    };
    Out::new(message, listing)
}
