use crate::model::{category_breakdown, Amount, CategoryTotal, Kind, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Totals over a set of transactions.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub income: Amount,
    pub expense: Amount,
    /// `income - expense`
    pub balance: Amount,
    pub count: usize,
}

impl Summary {
    pub fn of<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = Summary::default();
        let mut balance = Decimal::ZERO;
        for t in transactions {
            match t.kind() {
                Kind::Income => summary.income += t.amount(),
                Kind::Expense => summary.expense += t.amount(),
            }
            balance = balance.saturating_add(t.kind().sign() * t.amount().value());
            summary.count += 1;
        }
        summary.balance = Amount::new(balance);
        summary
    }
}

/// The data behind the statistics view: where the money went, and how income compares to
/// spending.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub expense_by_category: Vec<CategoryTotal>,
    pub total_income: Amount,
    pub total_expense: Amount,
}

impl Stats {
    pub fn of<'a, I>(transactions: I, top_n: usize) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
        I::IntoIter: Clone,
    {
        let iter = transactions.into_iter();
        let summary = Summary::of(iter.clone());
        Self {
            expense_by_category: category_breakdown(iter, Kind::Expense, top_n),
            total_income: summary.income,
            total_expense: summary.expense,
        }
    }

    /// The share of `total_income + total_expense` taken by income and by expense, in percent.
    /// `None` when both totals are zero.
    pub fn split(&self) -> Option<(Decimal, Decimal)> {
        match percentages(&[self.total_income, self.total_expense]).as_slice() {
            &[income, expense] => Some((income, expense)),
            _ => None,
        }
    }

    /// Each category's share of `total_expense`, in percent.
    pub fn category_shares(&self) -> Vec<(String, Decimal)> {
        let totals: Vec<Amount> = self.expense_by_category.iter().map(|c| c.total).collect();
        self.expense_by_category
            .iter()
            .map(|c| c.category.clone())
            .zip(percentages(&totals))
            .collect()
    }
}

/// Each part as a percentage of their sum, to one decimal. Empty when the sum is zero.
///
/// If the sum does not fit in a `Decimal`, every part is first divided by the number of parts.
fn percentages(parts: &[Amount]) -> Vec<Decimal> {
    let exact = parts
        .iter()
        .try_fold(Decimal::ZERO, |sum, part| sum.checked_add(part.value()));
    let (parts, whole): (Vec<Decimal>, Decimal) = match exact {
        Some(whole) => (parts.iter().map(Amount::value).collect(), whole),
        None => {
            let n = Decimal::from(parts.len());
            let scaled: Vec<Decimal> = parts.iter().map(|p| p.value() / n).collect();
            let whole = scaled
                .iter()
                .fold(Decimal::ZERO, |sum, part| sum.saturating_add(*part));
            (scaled, whole)
        }
    };
    if whole.is_zero() {
        return Vec::new();
    }
    parts
        .into_iter()
        .map(|part| (part / whole * Decimal::ONE_HUNDRED).round_dp(1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tx(id: u64, kind: Kind, amount: i64, category: &str) -> Transaction {
        Transaction::new(id, kind, "2024-01-10", "", Amount::from(amount), category)
    }

    #[test]
    fn test_summary() {
        let data = vec![
            tx(1, Kind::Income, 100, "Salary"),
            tx(2, Kind::Expense, 40, "Food"),
            tx(3, Kind::Expense, 10, "Bills"),
        ];
        let summary = Summary::of(&data);
        assert_eq!(
            summary,
            Summary {
                income: Amount::from(100),
                expense: Amount::from(50),
                balance: Amount::from(50),
                count: 3,
            }
        );
    }

    #[test]
    fn test_summary_empty() {
        let data: Vec<Transaction> = Vec::new();
        assert_eq!(Summary::of(&data), Summary::default());
    }

    #[test]
    fn test_summary_negative_balance() {
        let data = vec![tx(1, Kind::Expense, 70, "Food"), tx(2, Kind::Income, 20, "Bonus")];
        assert_eq!(Summary::of(&data).balance, Amount::from(-50));
    }

    #[test]
    fn test_stats() {
        let data = vec![
            tx(1, Kind::Income, 300, "Salary"),
            tx(2, Kind::Expense, 75, "Food"),
            tx(3, Kind::Expense, 25, "Bills"),
        ];
        let stats = Stats::of(&data, 5);
        assert_eq!(stats.total_income, Amount::from(300));
        assert_eq!(stats.total_expense, Amount::from(100));
        assert_eq!(stats.expense_by_category.len(), 2);
        assert_eq!(
            stats.split(),
            Some((Decimal::from(75), Decimal::from(25)))
        );
        assert_eq!(
            stats.category_shares(),
            vec![
                ("Food".to_string(), Decimal::from(75)),
                ("Bills".to_string(), Decimal::from(25)),
            ]
        );
    }

    #[test]
    fn test_split_rounds() {
        let stats = Stats {
            expense_by_category: Vec::new(),
            total_income: Amount::from(1),
            total_expense: Amount::from(2),
        };
        let (income, expense) = stats.split().unwrap();
        assert_eq!(income, Decimal::from_str("33.3").unwrap());
        assert_eq!(expense, Decimal::from_str("66.7").unwrap());
    }

    #[test]
    fn test_totals_near_the_decimal_bounds() {
        let huge = Amount::from_str("50000000000000000000000000000").unwrap();
        let data = vec![
            Transaction::new(1, Kind::Income, "2024-01-10", "", huge, "Salary"),
            Transaction::new(2, Kind::Income, "2024-01-11", "", huge, "Bonus"),
            Transaction::new(3, Kind::Expense, "2024-01-12", "", huge, "Food"),
            Transaction::new(4, Kind::Expense, "2024-01-13", "", huge, "Bills"),
        ];
        let summary = Summary::of(&data);
        assert_eq!(summary.income, Amount::new(Decimal::MAX));
        assert_eq!(summary.expense, Amount::new(Decimal::MAX));
        assert_eq!(summary.count, 4);

        let stats = Stats::of(&data, 1);
        assert_eq!(
            stats.split(),
            Some((Decimal::from(50), Decimal::from(50)))
        );
        assert_eq!(
            stats.category_shares(),
            vec![
                ("Bills".to_string(), Decimal::from(50)),
                ("Other".to_string(), Decimal::from(50)),
            ]
        );
    }

    #[test]
    fn test_split_empty() {
        assert_eq!(Stats::default().split(), None);
        assert!(Stats::default().category_shares().is_empty());
    }
}
