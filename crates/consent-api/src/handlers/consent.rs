//! Consent aggregate handlers

use crate::headers::OrgContext;
use crate::middleware::error_handler::ApiResult;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use consent_core::model::{CreateConsentRequest, RevokeConsentRequest};
use consent_db::repositories::ConsentSearchFilter;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentListQuery {
    /// Comma-separated consent types
    pub consent_type: Option<String>,
    /// Comma-separated consent statuses
    pub consent_status: Option<String>,
    /// Comma-separated client ids
    pub client_id: Option<String>,
    /// Comma-separated user ids (matched against authorization grants)
    pub user_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn comma_list(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// `POST /api/v1/consents`
pub async fn create_consent(
    state: web::Data<AppState>,
    ctx: OrgContext,
    body: web::Json<CreateConsentRequest>,
) -> ApiResult<HttpResponse> {
    let response = state.consents.create(&ctx, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// `GET /api/v1/consents/{id}`
pub async fn get_consent(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let response = state.consents.get(&ctx, &consent_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `PUT /api/v1/consents/{id}` — full replacement
pub async fn update_consent(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
    body: web::Json<CreateConsentRequest>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let response = state
        .consents
        .update(&ctx, &consent_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `PUT /api/v1/consents/{id}/revoke`
pub async fn revoke_consent(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
    body: web::Json<RevokeConsentRequest>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let response = state
        .consents
        .revoke(&ctx, &consent_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `DELETE /api/v1/consents/{id}`
pub async fn delete_consent(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    state.consents.delete(&ctx, &consent_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// `GET /api/v1/consents`
pub async fn list_consents(
    state: web::Data<AppState>,
    ctx: OrgContext,
    query: web::Query<ConsentListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = ConsentSearchFilter {
        consent_ids: Vec::new(),
        consent_types: comma_list(&query.consent_type),
        consent_statuses: comma_list(&query.consent_status),
        client_ids: comma_list(&query.client_id),
        limit: query.limit.unwrap_or(0),
        offset: query.offset.unwrap_or(0),
    };
    let user_ids = comma_list(&query.user_id);

    let response = state.consents.search(&ctx, filter, user_ids).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `GET /api/v1/consents/{id}/status-audit`
pub async fn get_consent_audit(
    state: web::Data<AppState>,
    ctx: OrgContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let consent_id = path.into_inner();
    let response = state.consents.get_status_audit(&ctx, &consent_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_list_parsing() {
        assert_eq!(
            comma_list(&Some("accounts, payments".to_string())),
            vec!["accounts".to_string(), "payments".to_string()]
        );
        assert_eq!(comma_list(&Some(" , ,".to_string())), Vec::<String>::new());
        assert_eq!(comma_list(&None), Vec::<String>::new());
    }
}
