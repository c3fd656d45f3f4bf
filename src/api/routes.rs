use crate::api::handlers;
use crate::api::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router with all routes and middleware. CORS allows any
/// origin; the API serves local frontends and desktop shells.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/analyze", post(handlers::analyze_content))
        .route("/api/stats", get(handlers::store_stats))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{sample_table, ContentStore};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new(dir.path()).unwrap();
        let app = create_router(AppState::new(store));
        (dir, app)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_dir, app) = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], json!("ok"));
    }

    #[tokio::test]
    async fn test_analyze_endpoint_small_table() {
        let (_dir, app) = test_app();
        let response = app
            .oneshot(post_json("/api/analyze", &json!({"views": [1, 2, 3]})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_records"], json!(3));
        assert!(body.get("clusters").is_none());
    }

    #[tokio::test]
    async fn test_analyze_endpoint_runs_advanced_stage() {
        let (_dir, app) = test_app();
        let table = sample_table(12, 42);
        let input = Value::Array(table.to_records());

        let response = app.oneshot(post_json("/api/analyze", &input)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_records"], json!(12));
        assert_eq!(body["clusters"]["n_clusters"], json!(3));
        assert_eq!(body["clusters"]["labels"].as_array().unwrap().len(), 12);
        assert!(body["correlations"]["views"]["likes"].is_number());
    }

    #[tokio::test]
    async fn test_analyze_endpoint_reports_construction_error() {
        let (_dir, app) = test_app();
        let response = app
            .oneshot(post_json("/api/analyze", &json!({"x": 5})))
            .await
            .unwrap();

        // Handled analysis failures are still a well-formed 200 body.
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
        assert_eq!(body["kind"], json!("construction"));
    }

    #[tokio::test]
    async fn test_analyze_endpoint_rejects_invalid_json() {
        let (_dir, app) = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_stats_endpoint_lists_saved_files() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new(dir.path()).unwrap();
        store.save_table(&sample_table(5, 42), "sample.csv").unwrap();
        let app = create_router(AppState::new(store));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["available_files"][0]["name"], json!("sample.csv"));
        assert!(body["timestamp"].is_string());
        assert!(body["data_directory"].is_string());
    }
}
