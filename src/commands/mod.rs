//! Command handlers for the ledger CLI.
//!
//! This module contains implementations for all CLI subcommands. Each handler loads what it needs
//! from the `Config`, does its work and returns an `Out` describing the result.

mod account;
mod delete;
mod export;
mod init;
mod insert;
mod profile;
mod query;
mod update;

use crate::model::{Amount, Summary, Transaction};
use serde::Serialize;
use std::fmt::Debug;
use std::fmt::Write;
use tracing::{debug, info};

pub use account::{login, register, reset_password};
pub use delete::delete;
pub use export::export;
pub use init::init;
pub use insert::add;
pub use profile::{profile_export, profile_show, profile_update};
pub use query::{categories, list, search, show, stats, summary, Listing};
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Renders transactions as a fixed-width text table, one row per transaction.
pub(crate) fn transaction_table(transactions: &[&Transaction], currency: &str) -> String {
    let description_width = transactions
        .iter()
        .map(|t| t.description().chars().count())
        .max()
        .unwrap_or(0)
        .clamp(11, 40);
    let mut table = String::new();
    let _ = writeln!(
        table,
        "{:>5}  {:<10}  {:<dw$}  {:>18}  {:<7}  {}",
        "ID",
        "Date",
        "Description",
        format!("Amount ({currency})"),
        "Type",
        "Category",
        dw = description_width
    );
    for t in transactions {
        let _ = writeln!(
            table,
            "{:>5}  {:<10}  {:<dw$}  {:>18}  {:<7}  {}",
            t.id(),
            t.date_str(),
            truncate(t.description(), description_width),
            t.amount().formatted(),
            t.display_label(),
            t.category(),
            dw = description_width
        );
    }
    table
}

/// Renders the totals of a summary on three lines.
pub(crate) fn summary_lines(summary: &Summary, currency: &str) -> String {
    format!(
        "Income:  {}\nExpense: {}\nBalance: {}",
        money(summary.income, currency),
        money(summary.expense, currency),
        money(summary.balance, currency)
    )
}

pub(crate) fn money(amount: Amount, currency: &str) -> String {
    format!("{} {currency}", amount.formatted())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Kind;

    #[test]
    fn test_out_message_only() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
    }

    #[test]
    fn test_transaction_table() {
        let t = Transaction::new(
            7,
            Kind::Expense,
            "2024-03-01",
            "A very long description that will not fit in the column",
            Amount::from(1250000),
            "Bills",
        );
        let table = transaction_table(&[&t], "VND");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Amount (VND)"));
        assert!(lines[1].contains("1,250,000.00"));
        assert!(lines[1].contains("2024-03-01"));
        assert!(lines[1].contains('…'));
        assert!(lines[1].ends_with("Bills"));
    }

    #[test]
    fn test_summary_lines() {
        let summary = Summary {
            income: Amount::from(100),
            expense: Amount::from(250),
            balance: Amount::from(-150),
            count: 2,
        };
        assert_eq!(
            summary_lines(&summary, "VND"),
            "Income:  100.00 VND\nExpense: 250.00 VND\nBalance: -150.00 VND"
        );
    }
}
