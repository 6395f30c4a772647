//! Consent validation handler
//!
//! The oracle endpoint answers HTTP 200 for every outcome, including a body
//! that is not valid JSON; only a missing org header is a plain 400.

use crate::headers::OrgContext;
use crate::middleware::error_handler::ApiResult;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use consent_core::model::{outcome, ValidateConsentRequest, ValidateConsentResponse};

/// `POST /api/v1/consents/validate`
pub async fn validate_consent(
    state: web::Data<AppState>,
    ctx: OrgContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let request = match serde_json::from_slice::<ValidateConsentRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            return Ok(HttpResponse::Ok().json(ValidateConsentResponse::failure(
                400,
                outcome::INVALID_REQUEST,
                format!("request body is not valid JSON: {}", e),
                None,
            )));
        }
    };

    let response = state.validation.validate(&ctx, &request).await;
    Ok(HttpResponse::Ok().json(response))
}
