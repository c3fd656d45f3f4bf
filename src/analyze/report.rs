use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use std::collections::BTreeMap;

/// Descriptive summary for a numeric column. Field names mirror the wire
/// format the API exposes, with quartiles keyed as percent labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent when fewer than two values exist.
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

/// Summary for non-numeric columns: how many values are present and how many
/// of them are distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Row-partitioning result of the clustering pass. Centers live in the
/// standardized (z-score) space the rows were clustered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    pub n_clusters: usize,
    pub cluster_centers: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
}

/// Pairwise Pearson correlations between numeric columns, keyed by column
/// name on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationMatrix(pub BTreeMap<String, BTreeMap<String, f64>>);

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.0.get(a).and_then(|row| row.get(b)).copied()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

/// The merged analysis output: basic statistics always, advanced sections
/// only when the row gate and data preconditions were met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_records: usize,
    pub columns: Vec<String>,
    pub summary: BTreeMap<String, ColumnSummary>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clusters: Option<ClusterResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationMatrix>,
    /// Textual note when the advanced stage ran but had nothing to compute.
    #[serde(rename = "advanced", skip_serializing_if = "Option::is_none")]
    pub advanced_note: Option<String>,
    /// Error captured inside the advanced stage; basic statistics are still
    /// present when this is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_error: Option<String>,
}

/// Which stage of the analysis failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The input could not form a table.
    Construction,
    /// Anything the analysis pipeline did not anticipate.
    Internal,
}

/// A fully absorbed analysis failure. Serializes with an `error` message so
/// transport callers always receive a well-formed body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
    pub kind: FailureKind,
}

/// Outcome of one analysis call. Nothing escapes the orchestrator as an
/// unhandled fault; callers branch on the variant instead of matching on
/// message strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(AnalysisReport),
    Failed(AnalysisFailure),
}

impl AnalysisOutcome {
    pub fn failed(kind: FailureKind, error: impl Into<String>) -> Self {
        Self::Failed(AnalysisFailure {
            error: error.into(),
            kind,
        })
    }

    pub fn as_report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failed(_) => None,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, JsonError> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_report() -> AnalysisReport {
        AnalysisReport {
            total_records: 2,
            columns: vec!["x".to_string()],
            summary: BTreeMap::new(),
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            clusters: None,
            correlations: None,
            advanced_note: None,
            advanced_error: None,
        }
    }

    #[test]
    fn test_absent_advanced_sections_are_not_serialized() {
        let value = serde_json::to_value(minimal_report()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("total_records"));
        assert!(!obj.contains_key("clusters"));
        assert!(!obj.contains_key("correlations"));
        assert!(!obj.contains_key("advanced"));
        assert!(!obj.contains_key("advanced_error"));
    }

    #[test]
    fn test_quartiles_serialize_as_percent_keys() {
        let summary = NumericSummary {
            count: 3,
            mean: 2.0,
            std: Some(1.0),
            min: 1.0,
            p25: 1.5,
            p50: 2.0,
            p75: 2.5,
            max: 3.0,
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["25%"], json!(1.5));
        assert_eq!(value["75%"], json!(2.5));
    }

    #[test]
    fn test_singleton_std_serializes_as_null() {
        let summary = NumericSummary {
            count: 1,
            mean: 5.0,
            std: None,
            min: 5.0,
            p25: 5.0,
            p50: 5.0,
            p75: 5.0,
            max: 5.0,
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(value["std"], serde_json::Value::Null);
    }

    #[test]
    fn test_failure_serializes_with_error_and_kind() {
        let outcome = AnalysisOutcome::failed(FailureKind::Construction, "bad input");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["error"], json!("bad input"));
        assert_eq!(value["kind"], json!("construction"));
        assert!(value.get("total_records").is_none());
    }

    #[test]
    fn test_internal_failure_kind_tag() {
        let outcome = AnalysisOutcome::failed(FailureKind::Internal, "boom");
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["kind"], json!("internal"));
    }

    #[test]
    fn test_report_outcome_round_trips() {
        let outcome = AnalysisOutcome::Report(minimal_report());
        let text = outcome.to_json(false).unwrap();
        let back: AnalysisOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(back, outcome);
        assert!(back.as_report().is_some());
    }

    #[test]
    fn test_correlation_matrix_lookup() {
        let mut outer = BTreeMap::new();
        let mut row = BTreeMap::new();
        row.insert("views".to_string(), 1.0);
        row.insert("likes".to_string(), 0.5);
        outer.insert("views".to_string(), row);
        let matrix = CorrelationMatrix(outer);
        assert_eq!(matrix.get("views", "likes"), Some(0.5));
        assert_eq!(matrix.get("likes", "views"), None);
    }
}
