use crate::analyze::advanced::{advanced_stats, AdvancedConfig, AdvancedStats};
use crate::analyze::basic::{basic_stats, BasicStats};
use crate::analyze::report::{AnalysisOutcome, AnalysisReport, FailureKind};
use crate::table::Table;
use serde_json::Value;
use tracing::{info, warn};

/// Rows beyond which the advanced stage runs.
const ADVANCED_ROW_THRESHOLD: usize = 10;

/// Builder for constructing a `ContentAnalyzer` instance.
///
/// # Examples
///
/// ```
/// use content_pulse::analyze::ContentAnalyzer;
///
/// let analyzer = ContentAnalyzer::builder()
///     .with_advanced_row_threshold(10)
///     .with_seed(42)
///     .build();
/// let outcome = analyzer.analyze(&serde_json::json!({"views": [1, 2, 3]}));
/// assert!(outcome.as_report().is_some());
/// ```
pub struct ContentAnalyzerBuilder {
    advanced_row_threshold: usize,
    advanced: AdvancedConfig,
}

impl ContentAnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            advanced_row_threshold: ADVANCED_ROW_THRESHOLD,
            advanced: AdvancedConfig::default(),
        }
    }

    /// Rows required before the clustering/correlation stage runs. The stage
    /// runs only for tables with strictly more rows than this.
    pub fn with_advanced_row_threshold(mut self, rows: usize) -> Self {
        self.advanced_row_threshold = rows;
        self
    }

    /// Seed for the clustering pass.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.advanced.seed = seed;
        self
    }

    /// Ceiling on the cluster count (the effective k never exceeds the row
    /// count).
    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.advanced.max_clusters = max_clusters;
        self
    }

    pub fn build(self) -> ContentAnalyzer {
        ContentAnalyzer {
            advanced_row_threshold: self.advanced_row_threshold,
            advanced: self.advanced,
        }
    }
}

impl Default for ContentAnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-shot analyzer for content-performance tables.
///
/// Each call builds its own table and numeric helpers, computes basic
/// statistics, and runs the advanced clustering/correlation stage when the
/// table is large enough. Every failure is absorbed into the returned
/// [`AnalysisOutcome`]; callers never see an unhandled fault.
pub struct ContentAnalyzer {
    advanced_row_threshold: usize,
    advanced: AdvancedConfig,
}

impl ContentAnalyzer {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ContentAnalyzerBuilder {
        ContentAnalyzerBuilder::new()
    }

    /// Analyze caller-supplied data.
    ///
    /// `input` is either a `{column: [values...]}` mapping or an array of row
    /// objects. Basic statistics are always computed; when the table has more
    /// than the configured number of rows the advanced stage adds clusters
    /// and correlations, a note when its preconditions fail, or an inline
    /// error when the stage itself fails.
    pub fn analyze(&self, input: &Value) -> AnalysisOutcome {
        let table = match Table::from_value(input) {
            Ok(table) => table,
            Err(e) => {
                warn!("Table construction failed: {}", e);
                return AnalysisOutcome::failed(FailureKind::Construction, e.to_string());
            }
        };

        info!(
            "Analyzing table rows={} columns={}",
            table.row_count(),
            table.column_count()
        );

        let mut report = AnalysisReport::from(basic_stats(&table));

        if table.row_count() > self.advanced_row_threshold {
            match advanced_stats(&table, &self.advanced) {
                Ok(AdvancedStats::Results {
                    clusters,
                    correlations,
                }) => {
                    report.clusters = Some(clusters);
                    report.correlations = Some(correlations);
                }
                Ok(AdvancedStats::Note(note)) => {
                    report.advanced_note = Some(note.to_string());
                }
                Err(e) => {
                    warn!("Advanced analysis failed: {}", e);
                    report.advanced_error = Some(e.to_string());
                }
            }
        }

        AnalysisOutcome::Report(report)
    }
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BasicStats> for AnalysisReport {
    fn from(basic: BasicStats) -> Self {
        Self {
            total_records: basic.total_records,
            columns: basic.columns,
            summary: basic.summary,
            timestamp: basic.timestamp,
            clusters: None,
            correlations: None,
            advanced_note: None,
            advanced_error: None,
        }
    }
}
