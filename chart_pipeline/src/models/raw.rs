//! Raw tabular market data as handed over by a [`DataSource`](crate::providers::DataSource).
//!
//! A table is a header of [`ColumnKey`]s plus date-indexed rows of optional
//! numbers. Single-symbol downloads use simple headers (`"Close"`), batched
//! multi-symbol downloads use compound headers (`["Close", "AAPL"]`).
//!
//! ```
//! use chart_pipeline::models::raw::{ColumnKey, RawTable};
//!
//! let json = r#"{
//!     "columns": [["Open", "XYZ"], ["Close", "XYZ"]],
//!     "rows": [{ "date": "2024-01-02", "values": [10.0, 11.0] }]
//! }"#;
//! let table: RawTable = serde_json::from_str(json).unwrap();
//! assert_eq!(table.columns()[1], ColumnKey::compound("Close", "XYZ"));
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One column header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnKey {
    /// A bare field name, e.g. `Close`.
    Simple(String),
    /// A `(field, symbol)` pair, e.g. `(Close, AAPL)`.
    Compound(String, String),
}

impl ColumnKey {
    pub fn simple(field: impl Into<String>) -> Self {
        Self::Simple(field.into())
    }

    pub fn compound(field: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::Compound(field.into(), symbol.into())
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound(..))
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(field) => f.write_str(field),
            Self::Compound(field, symbol) => write!(f, "({field}, {symbol})"),
        }
    }
}

/// One date-indexed row. `values[i]` belongs to `columns[i]`; `None` is a missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

impl RawRow {
    pub fn new(date: NaiveDate, values: Vec<Option<f64>>) -> Self {
        Self { date, values }
    }

    /// A row where every cell is present.
    pub fn filled(date: NaiveDate, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(date, values.into_iter().map(Some).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row dated {date} has {actual} values but the header has {expected} columns")]
pub struct RowWidthError {
    pub date: NaiveDate,
    pub expected: usize,
    pub actual: usize,
}

/// A header plus rows whose widths all match the header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "UncheckedTable")]
pub struct RawTable {
    columns: Vec<ColumnKey>,
    rows: Vec<RawRow>,
}

#[derive(Deserialize)]
struct UncheckedTable {
    #[serde(default)]
    columns: Vec<ColumnKey>,
    #[serde(default)]
    rows: Vec<RawRow>,
}

impl TryFrom<UncheckedTable> for RawTable {
    type Error = RowWidthError;

    fn try_from(raw: UncheckedTable) -> Result<Self, Self::Error> {
        RawTable::new(raw.columns, raw.rows)
    }
}

impl RawTable {
    pub fn new(columns: Vec<ColumnKey>, rows: Vec<RawRow>) -> Result<Self, RowWidthError> {
        let mut table = Self {
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// A table with neither columns nor rows, the "no data" response.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push_row(&mut self, row: RawRow) -> Result<(), RowWidthError> {
        if row.values.len() != self.columns.len() {
            return Err(RowWidthError {
                date: row.date,
                expected: self.columns.len(),
                actual: row.values.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Symbols named by compound headers, in first-seen order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for key in &self.columns {
            if let ColumnKey::Compound(_, symbol) = key {
                if !out.contains(&symbol.as_str()) {
                    out.push(symbol);
                }
            }
        }
        out
    }
}
