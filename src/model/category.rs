//! Category vocabularies and per-category aggregation.

use crate::model::{Amount, Kind, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The category used when none is given, and the bucket that collects categories outside the
/// top N of a breakdown.
pub const DEFAULT_CATEGORY: &str = "Other";

const INCOME_CATEGORIES: &[&str] = &["Salary", "Bonus", "Investment", DEFAULT_CATEGORY];

const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Shopping",
    "Entertainment",
    "Bills",
    DEFAULT_CATEGORY,
];

/// The suggested categories for a kind of transaction. A transaction's category does not need
/// to be one of these.
pub fn categories(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Income => INCOME_CATEGORIES,
        Kind::Expense => EXPENSE_CATEGORIES,
    }
}

/// The total for one category in a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

/// Sums the amounts of `kind` transactions per category and keeps the `top_n` largest, ordered
/// by total descending and then by name.
///
/// When there are more than `top_n` categories, the remainder is folded into a
/// `DEFAULT_CATEGORY` bucket if it is positive. If `DEFAULT_CATEGORY` is itself among the top
/// categories, the remainder is added to it.
pub fn category_breakdown<'a, I>(transactions: I, kind: Kind, top_n: usize) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: BTreeMap<&str, Amount> = BTreeMap::new();
    for t in transactions.into_iter().filter(|t| t.kind() == kind) {
        *totals.entry(t.category()).or_default() += t.amount();
    }

    let mut sorted: Vec<(&str, Amount)> = totals.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let rest: Amount = sorted.iter().skip(top_n).map(|(_, total)| *total).sum();
    let overflow = sorted.len() > top_n;
    sorted.truncate(top_n);

    let mut breakdown: Vec<CategoryTotal> = sorted
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();

    if overflow && rest.is_positive() {
        match breakdown
            .iter_mut()
            .find(|c| c.category == DEFAULT_CATEGORY)
        {
            Some(other) => other.total += rest,
            None => breakdown.push(CategoryTotal {
                category: DEFAULT_CATEGORY.to_string(),
                total: rest,
            }),
        }
    }
    breakdown
}
