//! Health check handlers for monitoring and load balancers

use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// `GET /health` — basic liveness plus version info
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": crate::SERVICE_NAME,
        "version": state.version(),
        "timestamp": chrono::Utc::now(),
    }))
}

/// `GET /health/detailed` — component-level health report
pub async fn detailed_health_check(state: web::Data<AppState>) -> HttpResponse {
    let result = state.health_check().await;

    if result.healthy {
        HttpResponse::Ok().json(result)
    } else {
        HttpResponse::ServiceUnavailable().json(result)
    }
}

/// `GET /health/ready` — readiness for traffic (database reachable)
pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    let result = state.health_check().await;

    if result.healthy {
        HttpResponse::Ok().json(serde_json::json!({ "ready": true }))
    } else {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({ "ready": false }))
    }
}

/// `GET /health/live` — process liveness only
pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}
