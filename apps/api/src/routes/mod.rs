pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;
use crate::{assessment, catalog, matching, matrix, maturity, profiles};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(catalog::handlers::handle_get_catalog))
        // Organizations and their role matrices
        .route(
            "/api/v1/organizations",
            post(matrix::handlers::handle_create_organization),
        )
        .route(
            "/api/v1/organizations/:org_id/role-process-matrix",
            get(matrix::handlers::handle_get_role_process_matrix)
                .put(matrix::handlers::handle_update_role_process_matrix),
        )
        .route(
            "/api/v1/organizations/:org_id/role-competency-matrix",
            get(matrix::handlers::handle_get_role_competency_matrix),
        )
        .route(
            "/api/v1/organizations/:org_id/role-competency-matrix/recompute",
            post(matrix::handlers::handle_recompute),
        )
        // Individual profiles and role matching
        .route(
            "/api/v1/organizations/:org_id/profiles/process-involvement",
            put(profiles::handlers::handle_put_process_involvement),
        )
        .route(
            "/api/v1/organizations/:org_id/profiles/classify-tasks",
            post(profiles::handlers::handle_classify_tasks),
        )
        .route(
            "/api/v1/organizations/:org_id/role-match",
            post(matching::handlers::handle_role_match),
        )
        // Assessments
        .route(
            "/api/v1/assessments",
            post(assessment::handlers::handle_create_assessment),
        )
        .route(
            "/api/v1/assessments/:id/gaps",
            get(assessment::handlers::handle_get_gaps),
        )
        .route(
            "/api/v1/assessments/:id/feedback",
            get(assessment::handlers::handle_get_feedback)
                .post(assessment::handlers::handle_generate_feedback),
        )
        .route(
            "/api/v1/maturity/score",
            post(maturity::handlers::handle_score_maturity),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::assessment::feedback::{CompetencyFeedback, FeedbackGenerator};
    use crate::assessment::gap::AreaGaps;
    use crate::classification::KeywordTaskClassifier;
    use crate::config::Config;
    use crate::errors::AppError;

    struct SilentGenerator;

    #[async_trait]
    impl FeedbackGenerator for SilentGenerator {
        async fn generate(&self, _area: &AreaGaps) -> Result<Vec<CompetencyFeedback>, AppError> {
            Ok(vec![])
        }
    }

    /// Router over a pool that never connects; only routes that fail or
    /// finish before touching the database can be exercised.
    fn test_router() -> Router {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/competency_test")
            .unwrap();
        let state = AppState {
            db,
            config: Config {
                database_url: String::new(),
                db_max_connections: 1,
                anthropic_api_key: String::new(),
                port: 0,
                rust_log: "info".to_string(),
                template_organization_id: 1,
                llm_timeout: Duration::from_secs(1),
            },
            task_classifier: Arc::new(KeywordTaskClassifier),
            feedback_generator: Arc::new(SilentGenerator),
        };
        build_router(state)
    }

    async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "competency-api");
    }

    #[tokio::test]
    async fn test_catalog_is_served_without_database() {
        let (status, body) = send("GET", "/api/v1/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["process_areas"].as_array().map(Vec::len), Some(30));
        assert_eq!(body["competencies"].as_array().map(Vec::len), Some(16));
    }

    #[tokio::test]
    async fn test_maturity_score_round_trip() {
        let answers = json!({
            "rolloutScope": 4,
            "seRolesProcesses": 5,
            "seMindset": 4,
            "knowledgeBase": 4
        });
        let (status, body) = send("POST", "/api/v1/maturity/score", Some(answers)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["final_score"], 100.0);
        assert_eq!(body["level"], "Optimized");
        assert_eq!(body["profile_type"], "Balanced Development");
    }

    #[tokio::test]
    async fn test_maturity_out_of_range_is_bad_request() {
        let answers = json!({
            "rolloutScope": 7,
            "seRolesProcesses": 5,
            "seMindset": 4,
            "knowledgeBase": 4
        });
        let (status, body) = send("POST", "/api/v1/maturity/score", Some(answers)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_role_match_requires_a_source() {
        let (status, body) = send(
            "POST",
            "/api/v1/organizations/1/role-match",
            Some(json!({ "mode": "compare" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_incomplete_assessment_is_rejected_before_storage() {
        let request = json!({
            "organization_id": 1,
            "profile": { "kind": "ephemeral", "user_name": "dana" },
            "answers": [{ "competency_id": 1, "survey_index": 2 }]
        });
        let (status, _) = send("POST", "/api/v1/assessments", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_matrix_edit_is_rejected() {
        let (status, _) = send(
            "PUT",
            "/api/v1/organizations/1/role-process-matrix",
            Some(json!({ "entries": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
