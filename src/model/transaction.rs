use crate::model::{Amount, DEFAULT_CATEGORY};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// The canonical textual form of a date, used for storage and comparison.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether a transaction brings money in or takes it out.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(Kind);
serde_plain::derive_fromstr_from_deserialize!(Kind);

impl Kind {
    /// The human readable label shown in listings and CSV exports.
    pub fn display_label(self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    /// The sign this kind contributes to a balance.
    pub fn sign(self) -> Decimal {
        match self {
            Kind::Income => Decimal::ONE,
            Kind::Expense => Decimal::NEGATIVE_ONE,
        }
    }
}

/// Restricts a query to one kind of transaction, or to none in particular.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    #[default]
    All,
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(KindFilter);
serde_plain::derive_fromstr_from_deserialize!(KindFilter);

impl KindFilter {
    pub fn matches(self, kind: Kind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Income => kind == Kind::Income,
            KindFilter::Expense => kind == Kind::Expense,
        }
    }
}

impl From<Kind> for KindFilter {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Income => KindFilter::Income,
            Kind::Expense => KindFilter::Expense,
        }
    }
}

impl From<Option<Kind>> for KindFilter {
    fn from(kind: Option<Kind>) -> Self {
        kind.map(KindFilter::from).unwrap_or_default()
    }
}

/// A single income or expense event.
///
/// Construction never fails: a malformed date becomes today, an empty category becomes
/// `DEFAULT_CATEGORY`. The setters apply the same rules. The `id` is fixed at construction.
///
/// When serialized, a transaction is the persisted record:
/// ```json
/// { "id": 3, "date": "2024-01-15", "description": "Lunch", "amount": 45000.0,
///   "type": "expense", "category": "Food" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    id: u64,
    date: NaiveDate,
    description: String,
    amount: Amount,
    #[serde(rename = "type")]
    kind: Kind,
    category: String,
}

impl Transaction {
    pub fn new(
        id: u64,
        kind: Kind,
        date: &str,
        description: impl Into<String>,
        amount: Amount,
        category: &str,
    ) -> Self {
        Self {
            id,
            date: coerce_date(date),
            description: description.into(),
            amount,
            kind,
            category: coerce_category(category),
        }
    }

    /// Builds a transaction from a persisted key-value record.
    ///
    /// Missing or empty fields take their defaults. The record is rejected when it is not an
    /// object, has no usable integer `id`, or has an `amount` that is not a number.
    pub fn from_record(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            bail!("Expected a transaction object, found {}", type_name(value));
        };
        let id = record_id(map)?;
        let kind = record_kind(map, id);
        let date = match map.get("date") {
            Some(Value::String(s)) => coerce_date(s),
            _ => {
                warn!("Transaction {id} has no date, using today");
                today()
            }
        };
        let description = match map.get("description") {
            None => String::new(),
            Some(v) if is_falsy(v) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        let amount = match map.get("amount") {
            None => Amount::ZERO,
            Some(v) => Amount::deserialize(v)
                .with_context(|| format!("Transaction {id} has an invalid amount {v}"))?,
        };
        let category = match map.get("category") {
            Some(Value::String(s)) => coerce_category(s),
            _ => DEFAULT_CATEGORY.to_string(),
        };
        Ok(Self {
            id,
            date,
            description,
            amount,
            kind,
            category,
        })
    }

    /// Converts the transaction into its persisted key-value record.
    pub fn to_record(&self) -> Result<Value> {
        serde_json::to_value(self)
            .with_context(|| format!("Unable to serialize transaction {}", self.id))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The date in its canonical `YYYY-MM-DD` form.
    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn display_label(&self) -> &'static str {
        self.kind.display_label()
    }

    pub fn set_date(&mut self, date: &str) {
        self.date = coerce_date(date);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.amount = amount;
    }

    pub fn set_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = coerce_category(category);
    }
}

/// `null`, `false`, zero, `""`, `[]` and `{}`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a `YYYY-MM-DD` date strictly.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

/// Parses a date, falling back to today when it is malformed.
pub(crate) fn coerce_date(s: &str) -> NaiveDate {
    match parse_date(s) {
        Ok(date) => date,
        Err(e) => {
            warn!("{e:#}; using today instead");
            today()
        }
    }
}

fn coerce_category(category: &str) -> String {
    if category.trim().is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category.to_string()
    }
}

fn record_id(map: &Map<String, Value>) -> Result<u64> {
    let id = match map.get("id") {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    id.with_context(|| {
        format!(
            "Transaction record has no usable id: {}",
            map.get("id").cloned().unwrap_or(Value::Null)
        )
    })
}

fn record_kind(map: &Map<String, Value>, id: u64) -> Kind {
    match map.get("type").and_then(Value::as_str) {
        Some("income") => Kind::Income,
        Some("expense") => Kind::Expense,
        other => {
            warn!("Transaction {id} has type {other:?}, treating it as an expense");
            Kind::Expense
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
