//! Channel summary: per-group totals with ratio-of-sums derived metrics.

use campaign_core::{GroupKey, ReportError, ReportResult, Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ─── Types ──────────────────────────────────────────────────────────────────

/// A derived column: `numerator / denominator * scale`, zero when the
/// denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetric {
    pub name: String,
    pub numerator: String,
    pub denominator: String,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl DerivedMetric {
    pub fn ratio(name: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            name: name.to_string(),
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
            scale: default_scale(),
        }
    }

    /// Same ratio expressed as a percentage.
    pub fn percent(name: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            scale: 100.0,
            ..Self::ratio(name, numerator, denominator)
        }
    }

    /// Evaluate on already-summed inputs, rounded to 2 decimals.
    pub fn evaluate(&self, numerator: f64, denominator: f64) -> f64 {
        round_half_up(safe_ratio(numerator, denominator) * self.scale, 2)
    }
}

pub const MARKETING_GROUP_BY: &str = "channel";
pub const MARKETING_SUM_COLUMNS: [&str; 4] = ["impressions", "clicks", "conversions", "cost"];

/// `CTR (%)` and `CPA (€)` as shown in the channel summary.
pub fn marketing_summary_metrics() -> Vec<DerivedMetric> {
    vec![
        DerivedMetric::percent("CTR (%)", "clicks", "impressions"),
        DerivedMetric::ratio("CPA (€)", "cost", "conversions"),
    ]
}

/// Row-level `ctr` / `cpa` columns accepted as optional raw inputs.
pub fn marketing_row_metrics() -> Vec<DerivedMetric> {
    vec![
        DerivedMetric::percent("ctr", "clicks", "impressions"),
        DerivedMetric::ratio("cpa", "cost", "conversions"),
    ]
}

// ─── Safe arithmetic ────────────────────────────────────────────────────────

/// `numerator / denominator`, or 0 when the denominator is zero or the
/// quotient is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_half_up(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        // normalise -0.0
        rounded + 0.0
    } else {
        value
    }
}

/// Running sum of one column. Integers stay exact until a float appears or
/// the sum overflows.
#[derive(Debug, Clone, Copy)]
enum Total {
    Int(i64),
    Float(f64),
}

impl Total {
    fn add(self, value: &Value) -> Option<Self> {
        Some(match (self, value) {
            (Total::Int(acc), Value::Int(v)) => match acc.checked_add(*v) {
                Some(sum) => Total::Int(sum),
                None => Total::Float(acc as f64 + *v as f64),
            },
            (Total::Int(acc), Value::Float(v)) => Total::Float(acc as f64 + v),
            (Total::Float(acc), v) => Total::Float(acc + v.as_f64()?),
            _ => return None,
        })
    }

    fn as_f64(self) -> f64 {
        match self {
            Total::Int(i) => i as f64,
            Total::Float(f) => f,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Total::Int(i) => Value::Int(i),
            Total::Float(f) => Value::Float(f),
        }
    }
}

// ─── Aggregator ─────────────────────────────────────────────────────────────

/// Groups rows by one column, sums numeric columns per group and derives
/// ratio metrics from the sums.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    group_by: String,
    sum_columns: Vec<String>,
    derived: Vec<DerivedMetric>,
}

impl MetricsAggregator {
    pub fn new<S: Into<String>>(
        group_by: impl Into<String>,
        sum_columns: impl IntoIterator<Item = S>,
        derived: Vec<DerivedMetric>,
    ) -> Self {
        Self {
            group_by: group_by.into(),
            sum_columns: sum_columns.into_iter().map(Into::into).collect(),
            derived,
        }
    }

    /// Channel summary: totals of impressions, clicks, conversions and cost
    /// with CTR and CPA.
    pub fn marketing() -> Self {
        Self::new(
            MARKETING_GROUP_BY,
            MARKETING_SUM_COLUMNS,
            marketing_summary_metrics(),
        )
    }

    pub fn with_group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = group_by.into();
        self
    }

    pub fn output_columns(&self) -> Vec<String> {
        std::iter::once(self.group_by.clone())
            .chain(self.sum_columns.iter().cloned())
            .chain(self.derived.iter().map(|m| m.name.clone()))
            .collect()
    }

    pub fn aggregate(&self, table: &Table) -> ReportResult<Table> {
        let group_idx = table.require_column(&self.group_by)?;
        let sum_idx = self
            .sum_columns
            .iter()
            .map(|c| table.require_column(c))
            .collect::<ReportResult<Vec<_>>>()?;

        // Derived inputs are positions within `sum_columns`.
        let derived_idx = self
            .derived
            .iter()
            .map(|m| {
                Ok((
                    self.sum_position(m, &m.numerator)?,
                    self.sum_position(m, &m.denominator)?,
                ))
            })
            .collect::<ReportResult<Vec<_>>>()?;

        let mut order: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<(Value, Vec<Total>)> = Vec::new();

        for (row_no, row) in table.rows().iter().enumerate() {
            let key_value = &row[group_idx];
            let slot = *order.entry(key_value.group_key()).or_insert_with(|| {
                groups.push((key_value.clone(), vec![Total::Int(0); sum_idx.len()]));
                groups.len() - 1
            });
            let totals = &mut groups[slot].1;
            for (pos, &col) in sum_idx.iter().enumerate() {
                totals[pos] = totals[pos].add(&row[col]).ok_or_else(|| {
                    ReportError::Schema(format!(
                        "column {:?} row {row_no}: {:?} is not numeric",
                        self.sum_columns[pos], row[col]
                    ))
                })?;
            }
        }

        let mut summary = Table::new(self.output_columns());
        for (key, totals) in groups {
            let mut out = Vec::with_capacity(1 + totals.len() + self.derived.len());
            out.push(key);
            out.extend(totals.iter().copied().map(Total::into_value));
            for (metric, &(num, den)) in self.derived.iter().zip(&derived_idx) {
                let value = metric.evaluate(totals[num].as_f64(), totals[den].as_f64());
                out.push(Value::Float(value));
            }
            summary.push_row(out)?;
        }

        debug!(
            group_by = %self.group_by,
            input_rows = table.row_count(),
            groups = summary.row_count(),
            "Aggregated summary table"
        );
        Ok(summary)
    }

    fn sum_position(&self, metric: &DerivedMetric, column: &str) -> ReportResult<usize> {
        self.sum_columns.iter().position(|c| c == column).ok_or_else(|| {
            ReportError::Schema(format!(
                "derived metric {:?} references {column:?}, which is not a summed column",
                metric.name
            ))
        })
    }
}

/// Group `table` by `group_by`, summing `sum_columns` and deriving `derived`.
pub fn aggregate(
    table: &Table,
    group_by: &str,
    sum_columns: &[&str],
    derived: &[DerivedMetric],
) -> ReportResult<Table> {
    let sum_columns = sum_columns.iter().copied();
    MetricsAggregator::new(group_by, sum_columns, derived.to_vec()).aggregate(table)
}

/// Append each metric whose column is missing, computed row by row with the
/// same safe division and rounding. Existing columns are left untouched.
pub fn append_missing_metrics(table: &Table, metrics: &[DerivedMetric]) -> ReportResult<Table> {
    let mut out = table.clone();
    for metric in metrics {
        if out.has_column(&metric.name) {
            continue;
        }
        let num_idx = out.require_column(&metric.numerator)?;
        let den_idx = out.require_column(&metric.denominator)?;
        let values = out
            .rows()
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                let numeric = |idx: usize| {
                    row[idx].as_f64().ok_or_else(|| {
                        ReportError::Schema(format!(
                            "column {:?} row {row_no}: {:?} is not numeric",
                            out.columns()[idx],
                            row[idx]
                        ))
                    })
                };
                Ok(Value::Float(metric.evaluate(numeric(num_idx)?, numeric(den_idx)?)))
            })
            .collect::<ReportResult<Vec<_>>>()?;
        out.push_column(metric.name.clone(), values)?;
    }
    Ok(out)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
