use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::handlers::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is up")),
    tag = "health"
)]
pub async fn liveness() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Dependencies reachable"),
        (status = 503, description = "Creation store unreachable")
    ),
    tag = "health"
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let (status, db_status) = match state.creations.health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    let overall_status = if status == StatusCode::OK {
        "ready"
    } else {
        "not_ready"
    };

    (
        status,
        Json(json!({
            "status": overall_status,
            "checks": {
                "database": db_status
            },
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
