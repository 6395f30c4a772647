//! Authorization resource handlers

use crate::headers::OrgContext;
use crate::middleware::error_handler::{ApiError, ApiResult};
use crate::services::auth_resource::UpdateAuthorizationRequest;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use consent_core::model::AuthorizationItem;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAuthQuery {
    pub user_id: Option<String>,
}

/// `POST /api/v1/consents/{consentId}/authorizations`
pub async fn create_authorization(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
    body: web::Json<AuthorizationItem>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let response = state
        .auth_resources
        .create(&ctx, &consent_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(response))
}

/// `GET /api/v1/consents/{consentId}/authorizations`
pub async fn list_authorizations(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let response = state.auth_resources.get_by_consent(&ctx, &consent_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `GET /api/v1/consents/{consentId}/authorizations/{authId}`
pub async fn get_authorization(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (consent_id, auth_id) = path.into_inner();
    let response = state
        .auth_resources
        .get(&ctx, &consent_id, &auth_id)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `PUT /api/v1/consents/{consentId}/authorizations/{authId}`
pub async fn update_authorization(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateAuthorizationRequest>,
) -> ApiResult<HttpResponse> {
    let (consent_id, auth_id) = path.into_inner();
    let response = state
        .auth_resources
        .update(&ctx, &consent_id, &auth_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `DELETE /api/v1/consents/{consentId}/authorizations/{authId}`
pub async fn delete_authorization(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (consent_id, auth_id) = path.into_inner();
    state
        .auth_resources
        .delete(&ctx, &consent_id, &auth_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// `PATCH /api/v1/consents/{consentId}/auth-resources/{authId}/status`
///
/// Fast path: the parent consent status is deliberately left untouched.
pub async fn update_authorization_status(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateStatusBody>,
) -> ApiResult<HttpResponse> {
    let (consent_id, auth_id) = path.into_inner();
    let response = state
        .auth_resources
        .update_status(&ctx, &consent_id, &auth_id, &body.status)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `PATCH /api/v1/consents/{consentId}/auth-resources/status`
pub async fn update_all_authorization_status(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
    body: web::Json<UpdateStatusBody>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let response = state
        .auth_resources
        .update_all_status(&ctx, &consent_id, &body.status)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `GET /api/v1/auth-resources?userId=…`
pub async fn get_user_authorizations(
    state: web::Data<AppState>,
    ctx: OrgContext,
    query: web::Query<UserAuthQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId query parameter is required".to_string()))?;

    let response = state.auth_resources.get_by_user(&ctx, user_id).await?;
    Ok(HttpResponse::Ok().json(response))
}
