//! CSV and JSON export of transactions and profiles.

use crate::model::{Profile, Transaction};
use crate::{utils, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tracing::info;

// ID,Date,Description,Amount,Type,Category
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvTransactionRow<'a> {
    #[serde(rename = "ID")]
    id: u64,
    date: String,
    description: &'a str,
    amount: String,
    #[serde(rename = "Type")]
    display_type: &'static str,
    category: &'a str,
}

impl<'a> From<&'a Transaction> for CsvTransactionRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            id: t.id(),
            date: t.date_str(),
            description: t.description(),
            amount: t.amount().to_string(),
            display_type: t.display_label(),
            category: t.category(),
        }
    }
}

// Username,Name,Date of Birth,Email,Phone,Role
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvProfileRow<'a> {
    username: &'a str,
    name: &'a str,
    #[serde(rename = "Date of Birth")]
    dob: &'a str,
    email: &'a str,
    phone: &'a str,
    role: &'static str,
}

/// A profile as exported to JSON. The password is never exported and the role is written as
/// its display label, as in the CSV export.
#[derive(Debug, Serialize)]
struct JsonProfile<'a> {
    username: &'a str,
    name: &'a str,
    dob: &'a str,
    email: &'a str,
    phone: &'a str,
    role: &'static str,
}

/// Writes `transactions` to `path` as CSV with the type shown as its display label.
pub(crate) fn transactions_csv(transactions: &[Transaction], path: &Path) -> Result<()> {
    write_csv(path, transactions.iter().map(CsvTransactionRow::from))?;
    info!(
        "Exported {} transactions to {}",
        transactions.len(),
        path.display()
    );
    Ok(())
}

/// Writes `transactions` to `path` as a JSON array of persisted records.
pub(crate) fn transactions_json(transactions: &[Transaction], path: &Path) -> Result<()> {
    utils::write_json(path, transactions)
        .with_context(|| format!("Unable to export transactions to {}", path.display()))?;
    info!(
        "Exported {} transactions to {}",
        transactions.len(),
        path.display()
    );
    Ok(())
}

/// Writes one profile to `path` as a CSV header and a single row.
pub(crate) fn profile_csv(username: &str, profile: &Profile, path: &Path) -> Result<()> {
    let row = CsvProfileRow {
        username,
        name: &profile.name,
        dob: &profile.dob,
        email: &profile.email,
        phone: &profile.phone,
        role: profile.role.display_label(),
    };
    write_csv(path, std::iter::once(row))?;
    info!("Exported profile '{username}' to {}", path.display());
    Ok(())
}

/// Writes one profile to `path` as a JSON object.
pub(crate) fn profile_json(username: &str, profile: &Profile, path: &Path) -> Result<()> {
    let out = JsonProfile {
        username,
        name: &profile.name,
        dob: &profile.dob,
        email: &profile.email,
        phone: &profile.phone,
        role: profile.role.display_label(),
    };
    utils::write_json(path, &out)
        .with_context(|| format!("Unable to export profile to {}", path.display()))?;
    info!("Exported profile '{username}' to {}", path.display());
    Ok(())
}

fn write_csv<R, I>(path: &Path, rows: I) -> Result<()>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create CSV file {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Unable to write CSV row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Unable to write CSV file {}", path.display()))
}
