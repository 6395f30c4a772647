//! Consent file handlers: pass-through blob storage

use crate::headers::OrgContext;
use crate::middleware::error_handler::ApiResult;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConsentFileRequest {
    pub file_content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentFileResponse {
    pub consent_id: String,
    pub file_content: String,
}

/// `POST /api/v1/consents/{id}/file`
pub async fn store_consent_file(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
    body: web::Json<StoreConsentFileRequest>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    state
        .consents
        .store_file(&ctx, &consent_id, body.into_inner().file_content)
        .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "consentId": consent_id })))
}

/// `GET /api/v1/consents/{id}/file`
pub async fn get_consent_file(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let file_content = state.consents.get_file(&ctx, &consent_id).await?;
    Ok(HttpResponse::Ok().json(ConsentFileResponse {
        consent_id,
        file_content,
    }))
}
