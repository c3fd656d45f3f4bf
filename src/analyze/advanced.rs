use crate::analyze::cluster::{kmeans, ClusterError, KMeansConfig};
use crate::analyze::report::{ClusterResult, CorrelationMatrix};
use crate::table::Table;
use std::collections::BTreeMap;
use tracing::debug;

/// Note returned when the table has no numeric columns at all.
pub const NO_NUMERIC_COLUMNS_NOTE: &str = "no numeric columns for analysis";

/// Note returned when the numeric slice of the table is too small to cluster.
pub const INSUFFICIENT_DATA_NOTE: &str = "insufficient data for advanced analysis";

/// Minimum rows and numeric columns before clustering is attempted.
const MIN_ROWS: usize = 3;
const MIN_NUMERIC_COLUMNS: usize = 2;

/// Parameters of the advanced stage.
#[derive(Debug, Clone)]
pub struct AdvancedConfig {
    /// Upper bound on the cluster count; the effective k is
    /// `min(max_clusters, rows)`.
    pub max_clusters: usize,
    /// Seed for the clustering pass, fixed so identical inputs reproduce
    /// identical partitions.
    pub seed: u64,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            max_clusters: 3,
            seed: 42,
        }
    }
}

/// What the advanced stage produced: either a note explaining why nothing was
/// computed, or clustering plus correlations.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvancedStats {
    Note(&'static str),
    Results {
        clusters: ClusterResult,
        correlations: CorrelationMatrix,
    },
}

/// Run clustering and correlation over the numeric columns of `table`.
///
/// The caller enforces the row-count gate; this function only checks its own
/// data preconditions. Missing numeric values are treated as 0 for the
/// clustering pass. Each call standardizes with fresh per-call state so
/// nothing leaks between analyses.
pub fn advanced_stats(
    table: &Table,
    config: &AdvancedConfig,
) -> Result<AdvancedStats, ClusterError> {
    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        return Ok(AdvancedStats::Note(NO_NUMERIC_COLUMNS_NOTE));
    }

    let rows = table.row_count();
    if rows < MIN_ROWS || numeric.len() < MIN_NUMERIC_COLUMNS {
        return Ok(AdvancedStats::Note(INSUFFICIENT_DATA_NOTE));
    }

    // Missing values count as 0 for the clustering pass.
    let filled: Vec<Vec<f64>> = numeric
        .iter()
        .map(|(_, cells)| cells.iter().map(|c| c.unwrap_or(0.0)).collect())
        .collect();

    let scaler = StandardScaler::fit(&filled);
    let points = scaler.transform_rows(&filled);

    let k = config.max_clusters.min(rows);
    debug!("Clustering rows={} numeric_columns={} k={}", rows, numeric.len(), k);

    let fit = kmeans(&points, &KMeansConfig::new(k).with_seed(config.seed))?;

    let correlations = correlation_matrix(&numeric);

    Ok(AdvancedStats::Results {
        clusters: ClusterResult {
            n_clusters: fit.k,
            cluster_centers: fit.centroids,
            labels: fit.labels,
        },
        correlations,
    })
}

/// Per-column z-score scaler. Fitted from the current table only and owned by
/// a single analysis call.
struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and population standard deviations, one per column.
    /// Zero-variance columns scale by 1 so they map to all-zero coordinates.
    fn fit(columns: &[Vec<f64>]) -> Self {
        let mut means = Vec::with_capacity(columns.len());
        let mut stds = Vec::with_capacity(columns.len());
        for column in columns {
            let n = column.len() as f64;
            let mean = column.iter().sum::<f64>() / n;
            let variance = column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
            let std = variance.sqrt();
            means.push(mean);
            stds.push(if std > 0.0 { std } else { 1.0 });
        }
        Self { means, stds }
    }

    /// Standardize and pivot column-major data into row-major points.
    fn transform_rows(&self, columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        (0..rows)
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(col, values)| (values[row] - self.means[col]) / self.stds[col])
                    .collect()
            })
            .collect()
    }
}

/// Full pairwise Pearson matrix over the original (unstandardized) numeric
/// columns. Pairs are computed over rows where both values are present; the
/// diagonal is 1 by definition and degenerate pairs report 0.
fn correlation_matrix(columns: &[(&str, &[Option<f64>])]) -> CorrelationMatrix {
    let mut matrix: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for (name_a, cells_a) in columns {
        let mut row = BTreeMap::new();
        for (name_b, cells_b) in columns {
            let r = if name_a == name_b {
                1.0
            } else {
                pearson(cells_a, cells_b)
            };
            row.insert((*name_b).to_string(), r);
        }
        matrix.insert((*name_a).to_string(), row);
    }
    CorrelationMatrix(matrix)
}

/// Pearson correlation over pairwise-complete observations. Returns 0 when
/// fewer than two complete pairs exist or either side has no variance.
fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    let n = pairs.len() as f64;
    if pairs.len() < 2 {
        return 0.0;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
