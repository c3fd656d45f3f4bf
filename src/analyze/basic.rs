use crate::analyze::report::{CategoricalSummary, ColumnSummary, NumericSummary};
use crate::table::{Column, Table};
use std::collections::BTreeMap;

/// Descriptive statistics computed for every table, regardless of size.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicStats {
    pub total_records: usize,
    pub columns: Vec<String>,
    pub summary: BTreeMap<String, ColumnSummary>,
    pub timestamp: String,
}

/// Compute row/column counts and per-column summaries.
///
/// Numeric columns get the full count/mean/std/min/quartiles/max treatment;
/// other columns report count and distinct values. Columns with no values at
/// all are listed in `columns` but left out of `summary`. An empty table is
/// a valid input and yields an empty summary.
pub fn basic_stats(table: &Table) -> BasicStats {
    let mut summary = BTreeMap::new();
    for (name, column) in table.columns() {
        if let Some(column_summary) = summarize_column(column) {
            summary.insert(name.to_string(), column_summary);
        }
    }

    BasicStats {
        total_records: table.row_count(),
        columns: table.column_names(),
        summary,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

fn summarize_column(column: &Column) -> Option<ColumnSummary> {
    if column.valid_count() == 0 {
        return None;
    }
    match column.as_numeric() {
        Some(cells) => {
            let values: Vec<f64> = cells.iter().flatten().copied().collect();
            Some(ColumnSummary::Numeric(describe_numeric(&values)))
        }
        None => Some(ColumnSummary::Categorical(CategoricalSummary {
            count: column.valid_count(),
            unique: column.unique_count(),
        })),
    }
}

fn describe_numeric(values: &[f64]) -> NumericSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    NumericSummary {
        count,
        mean,
        std: sample_std(&sorted, mean),
        min: sorted[0],
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.50),
        p75: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    }
}

/// Sample standard deviation (n − 1 denominator). Undefined for a single
/// observation.
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// Linear-interpolation percentile over pre-sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}
