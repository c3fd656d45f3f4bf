use crate::analyze::{AnalysisOutcome, ContentAnalyzer};
use crate::api::state::AppState;
use crate::store::StoreStats;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "content-pulse API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Analyze the posted table. Handled analysis failures still produce a 200
/// with an error body; only transport-level problems (e.g. a body that is
/// not JSON) surface as non-2xx, and those are rejected by the extractor
/// before this handler runs.
pub async fn analyze_content(Json(data): Json<Value>) -> Json<AnalysisOutcome> {
    let analyzer = ContentAnalyzer::new();
    Json(analyzer.analyze(&data))
}

pub async fn store_stats(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.store.stats())
}
