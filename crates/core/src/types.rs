//! Tabular data model shared by the aggregation and export stages.

use crate::error::{ReportError, ReportResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Scalar values ──────────────────────────────────────────────────────────

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    /// Type a raw text cell: integer, then float, then ISO date, else text.
    /// Surrounding whitespace is ignored by the typed parses only; text
    /// cells keep it.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Value::Date(d);
        }
        Value::Text(raw.to_string())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn group_key(&self) -> GroupKey {
        match self {
            Value::Int(i) => GroupKey::Int(*i),
            // -0.0 and 0.0 group together
            Value::Float(f) => GroupKey::Float((*f + 0.0).to_bits()),
            Value::Date(d) => GroupKey::Date(*d),
            Value::Text(s) => GroupKey::Text(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Hashable identity of a [`Value`], used to partition rows into groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Int(i64),
    Float(u64),
    Date(NaiveDate),
    Text(String),
}

// ─── Table ──────────────────────────────────────────────────────────────────

/// One record, aligned with the owning table's column order.
pub type Row = Vec<Value>;

/// Ordered columns plus ordered rows. Every row has exactly one value per
/// column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Wire shape of [`Table`]; deserialized tables pass the same arity checks
/// as [`Table::from_rows`].
#[derive(Deserialize)]
struct RawTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Row>,
}

impl TryFrom<RawTable> for Table {
    type Error = ReportError;

    fn try_from(raw: RawTable) -> ReportResult<Self> {
        Table::from_rows(raw.columns, raw.rows)
    }
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from rows, rejecting any row whose arity differs from
    /// the column count.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Row>) -> ReportResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Row) -> ReportResult<()> {
        if row.len() != self.columns.len() {
            return Err(ReportError::Schema(format!(
                "row {} has {} values, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`], but a missing column is a schema error.
    pub fn require_column(&self, name: &str) -> ReportResult<usize> {
        self.column_index(name)
            .ok_or_else(|| ReportError::missing_column(name))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn column_values(&self, name: &str) -> ReportResult<impl Iterator<Item = &Value>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Distinct values of a column in first-seen order.
    pub fn distinct(&self, column: &str) -> ReportResult<Vec<Value>> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for value in self.column_values(column)? {
            if seen.insert(value.group_key()) {
                values.push(value.clone());
            }
        }
        Ok(values)
    }

    /// Keep rows matching `predicate`, preserving order and columns.
    pub fn retain_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Row) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Append a column. `values` must supply one value per existing row.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> ReportResult<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(ReportError::Schema(format!(
                "column {name:?} already exists"
            )));
        }
        if values.len() != self.rows.len() {
            return Err(ReportError::Schema(format!(
                "column {name:?} has {} values, expected {}",
                values.len(),
                self.rows.len()
            )));
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            ["channel", "clicks"],
            vec![
                vec!["email".into(), 10.into()],
                vec!["social".into(), 20.into()],
                vec!["email".into(), 5.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_infer_types() {
        assert_eq!(Value::infer("42"), Value::Int(42));
        assert_eq!(Value::infer(" 12.5 "), Value::Float(12.5));
        assert_eq!(
            Value::infer("2024-03-01"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(Value::infer("Google Ads"), Value::Text("Google Ads".into()));
        assert_eq!(Value::infer("NaN"), Value::Text("NaN".into()));
    }

    #[test]
    fn test_infer_keeps_text_whitespace() {
        assert_eq!(Value::infer(" Email "), Value::Text(" Email ".into()));
        assert_eq!(Value::infer(" 007 "), Value::Int(7));
        assert_eq!(
            Value::infer(" 2024-03-01"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(400).to_string(), "400");
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::Float(17.5).to_string(), "17.5");
        assert_eq!(Value::Float(3.75).to_string(), "3.75");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).to_string(),
            "2024-01-05"
        );
        assert_eq!(Value::Text("Email".into()).to_string(), "Email");
    }

    #[test]
    fn test_push_row_rejects_wrong_arity() {
        let mut table = Table::new(["a", "b"]);
        let err = table.push_row(vec![1.into()]).unwrap_err();
        assert!(matches!(err, ReportError::Schema(_)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_distinct_first_seen_order() {
        let table = sample();
        let channels = table.distinct("channel").unwrap();
        assert_eq!(channels, vec![Value::from("email"), Value::from("social")]);
    }

    #[test]
    fn test_int_and_text_do_not_share_group() {
        assert_ne!(Value::Int(1).group_key(), Value::Text("1".into()).group_key());
        assert_eq!(Value::Float(0.0).group_key(), Value::Float(-0.0).group_key());
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let table = sample();
        assert!(matches!(table.require_column("cost"), Err(ReportError::Schema(_))));
        assert!(table.distinct("cost").is_err());
        assert_eq!(table.get(1, "clicks"), Some(&Value::Int(20)));
        assert_eq!(table.get(5, "clicks"), None);
    }

    #[test]
    fn test_deserialize_checks_row_arity() {
        let json = r#"{"columns":["channel","impressions","clicks"],"rows":[["Email"]]}"#;
        let err = serde_json::from_str::<Table>(json).unwrap_err();
        assert!(err.to_string().contains("row 0 has 1 values, expected 3"));

        let table: Table =
            serde_json::from_str(r#"{"columns":["channel","clicks"],"rows":[["Email",70]]}"#)
                .unwrap();
        assert_eq!(table.get(0, "clicks"), Some(&Value::Int(70)));
        assert_eq!(serde_json::to_value(&table).unwrap()["rows"][0][1], 70);
    }

    #[test]
    fn test_push_column() {
        let mut table = sample();
        table
            .push_column("cost", vec![1.5.into(), 2.0.into(), 0.5.into()])
            .unwrap();
        assert_eq!(table.columns(), ["channel", "clicks", "cost"]);
        assert_eq!(table.get(2, "cost"), Some(&Value::Float(0.5)));

        assert!(table.push_column("cost", vec![]).is_err());
        assert!(table.push_column("extra", vec![1.into()]).is_err());
    }
}
