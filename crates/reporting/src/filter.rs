//! Row selection by allowed column values (the channel picker of the
//! dashboard).

use campaign_core::{GroupKey, ReportResult, Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFilter {
    pub column: String,
    pub allowed: Vec<Value>,
}

impl ValueFilter {
    pub fn new(column: impl Into<String>, allowed: Vec<Value>) -> Self {
        Self {
            column: column.into(),
            allowed,
        }
    }

    /// Select every distinct value of `column`; applying it is a no-op.
    pub fn all(table: &Table, column: &str) -> ReportResult<Self> {
        Ok(Self::new(column, table.distinct(column)?))
    }

    /// Keep rows whose `column` value is one of `allowed`. An empty
    /// selection keeps nothing.
    pub fn apply(&self, table: &Table) -> ReportResult<Table> {
        let idx = table.require_column(&self.column)?;
        let allowed: HashSet<GroupKey> = self.allowed.iter().map(Value::group_key).collect();
        let filtered = table.retain_rows(|row| allowed.contains(&row[idx].group_key()));
        debug!(
            column = %self.column,
            selected = self.allowed.len(),
            kept = filtered.row_count(),
            dropped = table.row_count() - filtered.row_count(),
            "Applied value filter"
        );
        Ok(filtered)
    }
}
