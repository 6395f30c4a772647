use actix_web::{web, HttpResponse, Scope};

use crate::handlers::{auth_resource, consent, consent_file, health, validate};

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check routes (no versioning, used by load balancers)
        .service(health_routes())
        // API routes with versioning
        .service(api_v1_routes())
        // Root route
        .route("/", web::get().to(root_handler));
}

/// Configure health check routes
fn health_routes() -> Scope {
    web::scope("/health")
        .route("", web::get().to(health::health_check))
        .route("/detailed", web::get().to(health::detailed_health_check))
        .route("/ready", web::get().to(health::readiness_check))
        .route("/live", web::get().to(health::liveness_check))
}

/// Configure API v1 routes
fn api_v1_routes() -> Scope {
    web::scope("/api/v1")
        .service(consent_routes())
        .service(auth_resource_routes())
}

/// Consent aggregate routes. `/validate` must be registered before the
/// `{id}` resources so it is not captured as a consent id.
fn consent_routes() -> Scope {
    web::scope("/consents")
        // Create consent
        .route("", web::post().to(consent::create_consent))
        // Search consents
        .route("", web::get().to(consent::list_consents))
        // Validation oracle
        .route("/validate", web::post().to(validate::validate_consent))
        // Read single consent
        .route("/{id}", web::get().to(consent::get_consent))
        // Full replacement
        .route("/{id}", web::put().to(consent::update_consent))
        // Hard delete
        .route("/{id}", web::delete().to(consent::delete_consent))
        // Revoke
        .route("/{id}/revoke", web::put().to(consent::revoke_consent))
        // Status audit trail
        .route("/{id}/status-audit", web::get().to(consent::get_consent_audit))
        // File blob (pass-through)
        .route("/{id}/file", web::post().to(consent_file::store_consent_file))
        .route("/{id}/file", web::get().to(consent_file::get_consent_file))
        // Authorizations under a consent
        .route(
            "/{consent_id}/authorizations",
            web::post().to(auth_resource::create_authorization),
        )
        .route(
            "/{consent_id}/authorizations",
            web::get().to(auth_resource::list_authorizations),
        )
        .route(
            "/{consent_id}/authorizations/{auth_id}",
            web::get().to(auth_resource::get_authorization),
        )
        .route(
            "/{consent_id}/authorizations/{auth_id}",
            web::put().to(auth_resource::update_authorization),
        )
        .route(
            "/{consent_id}/authorizations/{auth_id}",
            web::delete().to(auth_resource::delete_authorization),
        )
        // Status fast paths
        .route(
            "/{consent_id}/auth-resources/status",
            web::patch().to(auth_resource::update_all_authorization_status),
        )
        .route(
            "/{consent_id}/auth-resources/{auth_id}/status",
            web::patch().to(auth_resource::update_authorization_status),
        )
}

/// Cross-consent authorization lookup
fn auth_resource_routes() -> Scope {
    web::scope("/auth-resources")
        .route("", web::get().to(auth_resource::get_user_authorizations))
}

/// Root handler - returns basic API information
async fn root_handler() -> HttpResponse {
    let response = serde_json::json!({
        "service": crate::SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Consent management service",
        "api_version": crate::API_VERSION,
        "endpoints": {
            "health": "/health",
            "readiness": "/health/ready",
            "liveness": "/health/live",
            "consents": "/api/v1/consents",
            "validation": "/api/v1/consents/validate",
            "auth_resources": "/api/v1/auth-resources"
        },
        "timestamp": chrono::Utc::now()
    });

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_root_handler() {
        let app =
            test::init_service(App::new().route("/", web::get().to(root_handler))).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["service"], crate::SERVICE_NAME);
        assert_eq!(body["api_version"], "v1");
    }
}
