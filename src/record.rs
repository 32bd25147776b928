//! Raw customer records and the in-memory reference table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single raw attribute value as read from a table or entered by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Coerce to a number. Text is trimmed and parsed; blank text yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Number(_) => None,
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Categorical view of the value. Integral numbers render without a fraction
    /// so that `0` read from a CSV and `0.0` from JSON name the same category.
    pub fn as_category(&self) -> String {
        match self {
            Value::Text(s) => s.trim().to_string(),
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Value::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

/// One customer: attribute name to raw value. Absent keys are missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(attribute, value);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(attribute.into(), value.into());
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    pub fn remove(&mut self, attribute: &str) -> Option<Value> {
        self.values.remove(attribute)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Ordered sequence of records sharing one header. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Iterator over one column; missing cells are `None`.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows.iter().map(move |row| row.get(name))
    }

    /// Returns a copy of the table without the given columns.
    pub fn without_columns(&self, drop: &[String]) -> RawTable {
        let columns = self
            .columns
            .iter()
            .filter(|c| !drop.contains(c))
            .cloned()
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                for name in drop {
                    row.remove(name);
                }
                row
            })
            .collect();
        RawTable::new(columns, rows)
    }

    /// Partition rows by predicate, keeping the header.
    pub fn partition<F>(self, mut keep: F) -> (RawTable, RawTable)
    where
        F: FnMut(&Record) -> bool,
    {
        let (kept, dropped): (Vec<Record>, Vec<Record>) =
            self.rows.into_iter().partition(|r| keep(r));
        (
            RawTable::new(self.columns.clone(), kept),
            RawTable::new(self.columns, dropped),
        )
    }
}
