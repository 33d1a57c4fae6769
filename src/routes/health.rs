use axum::{http::StatusCode, response::Json};

use crate::models::{HealthResponse, StatusResponse};

// GET / - Service banner
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "PyBaseball service is running".to_string(),
    })
}

// GET /health - Liveness probe
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };

    (StatusCode::OK, Json(response))
}
