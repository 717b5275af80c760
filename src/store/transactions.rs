use crate::error::{ErrorType, IntoResult};
use crate::export;
use crate::model::{parse_date, KindFilter, Stats, Summary, Transaction};
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Criteria for `TransactionStore::filter`. Dates are raw `YYYY-MM-DD` strings as typed by the
/// user; empty strings count as absent.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Query {
    pub start: Option<String>,
    pub end: Option<String>,
    pub kind: KindFilter,
}

impl Query {
    pub fn new(start: Option<String>, end: Option<String>, kind: KindFilter) -> Self {
        Self { start, end, kind }
    }

    /// Parses both bounds. A malformed bound yields an error describing it.
    fn date_range(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        let parse = |bound: &Option<String>| -> Result<Option<NaiveDate>> {
            match bound.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => parse_date(s).map(Some),
            }
        };
        Ok((parse(&self.start)?, parse(&self.end)?))
    }
}

/// The outcome of a filter: the matching transactions, in store order, and a warning when the
/// date bounds could not be used.
#[derive(Debug, Clone)]
pub struct Filtered<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub warning: Option<String>,
}

/// The in-memory list of transactions backed by a JSON file.
///
/// Every mutation rewrites the whole file. If the write fails, the in-memory list is restored
/// so that it keeps matching the file.
///
/// When the file exists but could not be read, the first save copies it aside with
/// `utils::set_aside` before writing, so the unreadable history is never lost.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    path: PathBuf,
    transactions: Vec<Transaction>,
    unreadable: bool,
}

impl TransactionStore {
    /// Creates an empty store backed by `path` without reading it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            transactions: Vec::new(),
            unreadable: false,
        }
    }

    /// Creates a store backed by `path` and loads it. A file that cannot be loaded leaves the
    /// store empty; the problem is logged and the file is kept aside on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        if let Err(e) = store.load() {
            error!("Starting with no transactions: {e:#}");
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory list with the contents of the backing file and returns how many
    /// transactions were loaded.
    ///
    /// A missing file is an empty store. Records that cannot be read are skipped with a warning.
    /// If the file as a whole cannot be read, the store is emptied and the error is returned.
    pub fn load(&mut self) -> Result<usize> {
        self.transactions.clear();
        self.unreadable = false;
        if !self.path.exists() {
            debug!("No transactions file at {}", self.path.display());
            return Ok(0);
        }
        let records = read_records(&self.path)
            .inspect_err(|_| self.unreadable = true)
            .pub_result(ErrorType::Io)?;
        let total = records.len();
        for (ix, record) in records.iter().enumerate() {
            match Transaction::from_record(record) {
                Ok(t) => self.transactions.push(t),
                Err(e) => warn!("Skipping transaction record {ix}: {e:#}"),
            }
        }
        let loaded = self.transactions.len();
        if loaded < total {
            warn!("Loaded {loaded} of {total} transaction records");
        } else {
            debug!("Loaded {loaded} transactions");
        }
        Ok(loaded)
    }

    /// Rewrites the backing file with every transaction. If the last load failed, the file is
    /// first copied aside; should that copy fail, nothing is written.
    pub fn save(&mut self) -> Result<()> {
        if self.unreadable && self.path.exists() {
            let aside = utils::set_aside(&self.path)
                .context("Unable to keep a copy of the unreadable transactions file")
                .pub_result(ErrorType::Io)?;
            warn!(
                "The unreadable transactions file was copied to {}",
                aside.display()
            );
        }
        utils::write_json(&self.path, &self.transactions)
            .context("Unable to save transactions")
            .pub_result(ErrorType::Io)?;
        self.unreadable = false;
        Ok(())
    }

    /// Appends `transaction` and saves.
    pub fn add(&mut self, transaction: Transaction) -> Result<()> {
        let id = transaction.id();
        self.transactions.push(transaction);
        if let Err(e) = self.save() {
            self.transactions.pop();
            return Err(e);
        }
        info!("Added transaction {id}");
        Ok(())
    }

    /// Replaces the transaction with the same id and saves. Fails with `ErrorType::NotFound`,
    /// changing nothing, when there is no such transaction.
    pub fn update(&mut self, transaction: Transaction) -> Result<()> {
        let id = transaction.id();
        let ix = self
            .transactions
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| anyhow!("Transaction {id} not found"))
            .pub_result(ErrorType::NotFound)?;
        let previous = std::mem::replace(&mut self.transactions[ix], transaction);
        if let Err(e) = self.save() {
            self.transactions[ix] = previous;
            return Err(e);
        }
        info!("Updated transaction {id}");
        Ok(())
    }

    /// Removes every transaction with `id` and saves, returning how many were removed. Fails with
    /// `ErrorType::NotFound`, without saving, when none match.
    pub fn delete(&mut self, id: u64) -> Result<usize> {
        let before = self.transactions.clone();
        self.transactions.retain(|t| t.id() != id);
        let removed = before.len() - self.transactions.len();
        if removed == 0 {
            return Err(anyhow!("Transaction {id} not found")).pub_result(ErrorType::NotFound);
        }
        if let Err(e) = self.save() {
            self.transactions = before;
            return Err(e);
        }
        info!("Deleted transaction {id}");
        Ok(removed)
    }

    pub fn get_by_id(&self, id: u64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    /// One more than the largest id in the store, or 1 when the store is empty.
    pub fn next_id(&self) -> u64 {
        self.transactions
            .iter()
            .map(Transaction::id)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// All transactions in the order they were added.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// All transactions, newest date first. Transactions on the same date keep the order they
    /// were added in.
    pub fn list(&self) -> Vec<&Transaction> {
        let mut list: Vec<&Transaction> = self.transactions.iter().collect();
        list.sort_by(|a, b| b.date().cmp(&a.date()));
        list
    }

    /// Selects the transactions dated within `[start, end]` (inclusive, either bound optional)
    /// whose kind matches `query.kind`.
    ///
    /// A malformed bound does not fail the filter: date filtering is skipped and the returned
    /// `warning` says why.
    pub fn filter(&self, query: &Query) -> Filtered<'_> {
        let (range, warning) = match query.date_range() {
            Ok(range) => (range, None),
            Err(e) => {
                let message = format!("{e:#}; showing all dates");
                warn!("{message}");
                ((None, None), Some(message))
            }
        };
        let (start, end) = range;
        let transactions = self
            .transactions
            .iter()
            .filter(|t| start.map_or(true, |s| t.date() >= s))
            .filter(|t| end.map_or(true, |e| t.date() <= e))
            .filter(|t| query.kind.matches(t.kind()))
            .collect();
        Filtered {
            transactions,
            warning,
        }
    }

    /// Totals over `subset`, or over the whole store when `subset` is `None`.
    pub fn summarize(&self, subset: Option<&[&Transaction]>) -> Summary {
        match subset {
            Some(subset) => Summary::of(subset.iter().copied()),
            None => Summary::of(&self.transactions),
        }
    }

    /// Statistics for the transactions dated within `[start, end]`, keeping the `top_n` largest
    /// expense categories.
    pub fn stats(
        &self,
        start: Option<String>,
        end: Option<String>,
        top_n: usize,
    ) -> (Stats, Option<String>) {
        let filtered = self.filter(&Query::new(start, end, KindFilter::All));
        let stats = Stats::of(filtered.transactions.iter().copied(), top_n);
        (stats, filtered.warning)
    }

    /// Writes every transaction, not a filtered subset, to `path` as CSV.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        export::transactions_csv(&self.transactions, path.as_ref()).pub_result(ErrorType::Io)
    }

    /// Writes every transaction, not a filtered subset, to `path` as JSON.
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<()> {
        export::transactions_json(&self.transactions, path.as_ref()).pub_result(ErrorType::Io)
    }
}

fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = utils::read(path)?;
    serde_json::from_str::<Vec<Value>>(&content)
        .with_context(|| format!("Failed to parse transactions file at {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, Kind};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn tx(id: u64, kind: Kind, date: &str, amount: i64) -> Transaction {
        Transaction::new(id, kind, date, format!("t{id}"), Amount::from(amount), "")
    }

    fn store_with(dir: &TempDir, data: Vec<Transaction>) -> TransactionStore {
        let mut store = TransactionStore::new(dir.path().join("transactions.json"));
        for t in data {
            store.add(t).unwrap();
        }
        store
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = TransactionStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, vec![tx(1, Kind::Income, "2024-01-01", 100)]);
        let reopened = TransactionStore::open(store.path());
        assert_eq!(reopened.transactions(), store.transactions());
    }

    #[test]
    fn test_next_id() {
        let dir = TempDir::new().unwrap();
        let empty = TransactionStore::new(dir.path().join("empty.json"));
        assert_eq!(empty.next_id(), 1);

        let store = store_with(
            &dir,
            vec![
                tx(1, Kind::Income, "2024-01-01", 1),
                tx(3, Kind::Income, "2024-01-01", 1),
                tx(5, Kind::Income, "2024-01-01", 1),
            ],
        );
        assert_eq!(store.next_id(), 6);
    }

    #[test]
    fn test_filter_range_and_kind() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            vec![
                tx(1, Kind::Expense, "2023-12-31", 5),
                tx(2, Kind::Expense, "2024-01-01", 10),
                tx(3, Kind::Income, "2024-01-15", 100),
                tx(4, Kind::Expense, "2024-01-31", 20),
                tx(5, Kind::Expense, "2024-02-01", 30),
            ],
        );
        let query = Query::new(
            Some("2024-01-01".into()),
            Some("2024-01-31".into()),
            KindFilter::Expense,
        );
        let filtered = store.filter(&query);
        let ids: Vec<u64> = filtered.transactions.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![2, 4]);
        assert!(filtered.warning.is_none());
    }

    #[test]
    fn test_filter_open_bounds() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            vec![
                tx(1, Kind::Expense, "2024-01-01", 1),
                tx(2, Kind::Income, "2024-03-01", 1),
            ],
        );
        let all = store.filter(&Query::default());
        assert_eq!(all.transactions.len(), 2);

        let since = store.filter(&Query::new(Some("2024-02-01".into()), None, KindFilter::All));
        assert_eq!(since.transactions.len(), 1);
        assert_eq!(since.transactions[0].id(), 2);

        let until = store.filter(&Query::new(None, Some(" ".into()), KindFilter::Income));
        assert_eq!(until.transactions.len(), 1);
    }

    #[test]
    fn test_filter_malformed_bound_warns_and_ignores_dates() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            vec![
                tx(1, Kind::Expense, "2020-01-01", 1),
                tx(2, Kind::Income, "2024-03-01", 1),
            ],
        );
        let query = Query::new(
            Some("2024-13-45".into()),
            Some("2024-12-31".into()),
            KindFilter::Expense,
        );
        let filtered = store.filter(&query);
        assert_eq!(filtered.transactions.len(), 1);
        assert_eq!(filtered.transactions[0].id(), 1);
        assert!(filtered.warning.unwrap().contains("2024-13-45"));
    }

    #[test]
    fn test_summarize_subset_and_whole() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            vec![
                tx(1, Kind::Income, "2024-01-01", 100),
                tx(2, Kind::Expense, "2024-01-02", 40),
                tx(3, Kind::Expense, "2024-01-03", 10),
            ],
        );
        let whole = store.summarize(None);
        assert_eq!(whole.income, Amount::from(100));
        assert_eq!(whole.expense, Amount::from(50));
        assert_eq!(whole.balance, Amount::from(50));
        assert_eq!(whole.count, 3);

        let expenses = store.filter(&Query::new(None, None, KindFilter::Expense));
        let part = store.summarize(Some(expenses.transactions.as_slice()));
        assert_eq!(part.count, 2);
        assert_eq!(part.balance, Amount::from(-50));
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(
            &dir,
            vec![
                tx(1, Kind::Income, "2024-01-01", 1),
                tx(2, Kind::Income, "2024-01-01", 1),
            ],
        );

        let err = store.delete(99).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
        assert_eq!(store.len(), 2);

        assert_eq!(store.delete(1).unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get_by_id(1).is_none());
        assert_eq!(TransactionStore::open(store.path()).len(), 1);
    }

    #[test]
    fn test_update() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(&dir, vec![tx(1, Kind::Expense, "2024-01-01", 10)]);

        let mut changed = store.get_by_id(1).unwrap().clone();
        changed.set_amount(Amount::from(25));
        changed.set_category("Food");
        store.update(changed).unwrap();
        let reopened = TransactionStore::open(store.path());
        assert_eq!(reopened.get_by_id(1).unwrap().amount(), Amount::from(25));
        assert_eq!(reopened.get_by_id(1).unwrap().category(), "Food");
    }

    #[test]
    fn test_update_missing_does_not_append() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(&dir, vec![tx(1, Kind::Expense, "2024-01-01", 10)]);
        let err = store.update(tx(7, Kind::Income, "2024-01-01", 5)).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
        assert_eq!(store.len(), 1);
        assert!(store.get_by_id(7).is_none());
    }

    #[test]
    fn test_load_skips_malformed_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");
        utils::write(
            &path,
            r#"[
                {"id": 1, "date": "2024-01-05", "description": "Salary", "amount": 1000,
                 "type": "income", "category": "Salary"},
                {"id": "not-a-number", "amount": "lots"}
            ]"#,
        )
        .unwrap();
        let mut store = TransactionStore::new(&path);
        assert_eq!(store.load().unwrap(), 1);
        assert_eq!(store.get_by_id(1).unwrap().description(), "Salary");
    }

    #[test]
    fn test_load_unreadable_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");
        utils::write(&path, "{ this is not json").unwrap();
        let mut store = TransactionStore::new(&path);
        let err = store.load().unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Io));
        assert!(store.is_empty());
        assert!(TransactionStore::open(&path).is_empty());
    }

    #[test]
    fn test_unreadable_file_is_kept_aside_before_saving() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");
        let damaged = r#"[{"id": 1, "date": "2024-01-05", "description": "Salary",
            "amount": 1000, "type": "income", "category": "Salary"},]"#;
        utils::write(&path, damaged).unwrap();

        let mut store = TransactionStore::open(&path);
        assert!(store.is_empty());
        store.add(tx(1, Kind::Expense, "2024-02-01", 5)).unwrap();
        store.add(tx(2, Kind::Expense, "2024-02-02", 6)).unwrap();

        let asides: Vec<PathBuf> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".unreadable."))
            .collect();
        assert_eq!(asides.len(), 1);
        assert_eq!(utils::read(&asides[0]).unwrap(), damaged);
        assert_eq!(TransactionStore::open(&path).len(), 2);
    }

    #[test]
    fn test_load_clamps_out_of_range_amount() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.json");
        utils::write(
            &path,
            r#"[{"id": 1, "date": "2024-01-05", "description": "Windfall", "amount": 1e29,
                 "type": "income", "category": "Other"}]"#,
        )
        .unwrap();
        let mut store = TransactionStore::new(&path);
        assert_eq!(store.load().unwrap(), 1);
        let amount = store.get_by_id(1).unwrap().amount();
        assert_eq!(amount.value(), Decimal::MAX);
    }

    #[test]
    fn test_summarize_at_large_amounts() {
        let dir = TempDir::new().unwrap();
        let huge = Amount::from_str("50000000000000000000000000000").unwrap();
        let mut store = TransactionStore::new(dir.path().join("transactions.json"));
        for id in 1..=2 {
            let t = Transaction::new(id, Kind::Income, "2024-01-01", "Windfall", huge, "");
            store.add(t).unwrap();
        }
        let summary = store.summarize(None);
        assert_eq!(summary.income.value(), Decimal::MAX);
        assert_eq!(summary.balance.value(), Decimal::MAX);
        assert_eq!(summary.count, 2);

        let (stats, _) = store.stats(None, None, 5);
        assert_eq!(stats.total_income.value(), Decimal::MAX);
        assert!(stats.expense_by_category.is_empty());
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let dir = TempDir::new().unwrap();
        let mut store = TransactionStore::new(dir.path().join("missing").join("t.json"));
        let err = store.add(tx(1, Kind::Income, "2024-01-01", 1)).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Io));
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            vec![
                tx(1, Kind::Income, "2024-01-01", 1),
                tx(2, Kind::Income, "2024-03-01", 1),
                tx(3, Kind::Income, "2024-02-01", 1),
                tx(4, Kind::Income, "2024-03-01", 1),
            ],
        );
        let ids: Vec<u64> = store.list().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_stats_by_range() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            vec![
                tx(1, Kind::Income, "2024-01-01", 500),
                tx(2, Kind::Expense, "2024-01-02", 40),
                tx(3, Kind::Expense, "2024-05-02", 60),
            ],
        );
        let (stats, warning) =
            store.stats(Some("2024-01-01".into()), Some("2024-01-31".into()), 5);
        assert!(warning.is_none());
        assert_eq!(stats.total_income, Amount::from(500));
        assert_eq!(stats.total_expense, Amount::from(40));
    }
}
