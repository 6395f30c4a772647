//! Tenant context extraction
//!
//! Every endpoint is scoped to an organization via the `org-id` header; the
//! `client-id` header identifies the originating client application and is
//! recorded on consent creation.

use crate::middleware::error_handler::ApiError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use consent_core::MAX_ID_LENGTH;
use std::future::{ready, Ready};

pub const ORG_ID_HEADER: &str = "org-id";
pub const CLIENT_ID_HEADER: &str = "client-id";

/// Request-scoped tenant context, extracted from headers.
#[derive(Debug, Clone)]
pub struct OrgContext {
    pub org_id: String,
    pub client_id: Option<String>,
}

impl OrgContext {
    pub fn new(org_id: impl Into<String>, client_id: Option<String>) -> Self {
        Self {
            org_id: org_id.into(),
            client_id,
        }
    }

    fn from_http_request(req: &HttpRequest) -> Result<Self, ApiError> {
        let org_id = header_value(req, ORG_ID_HEADER);

        let org_id = match org_id {
            Some(value) => value,
            None => {
                return Err(ApiError::BadRequest(
                    "organization ID header is required".to_string(),
                ))
            }
        };

        if org_id.len() > MAX_ID_LENGTH {
            return Err(ApiError::BadRequest(format!(
                "organization ID header exceeds the maximum length of {} characters",
                MAX_ID_LENGTH
            )));
        }

        Ok(Self {
            org_id,
            client_id: header_value(req, CLIENT_ID_HEADER),
        })
    }
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl FromRequest for OrgContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extracts_org_and_client() {
        let req = TestRequest::default()
            .insert_header((ORG_ID_HEADER, "org-1"))
            .insert_header((CLIENT_ID_HEADER, "app-9"))
            .to_http_request();

        let ctx = OrgContext::from_http_request(&req).unwrap();
        assert_eq!(ctx.org_id, "org-1");
        assert_eq!(ctx.client_id.as_deref(), Some("app-9"));
    }

    #[test]
    fn test_missing_org_header_is_rejected() {
        let req = TestRequest::default().to_http_request();
        let err = OrgContext::from_http_request(&req).unwrap_err();
        assert!(err.to_string().contains("organization ID header is required"));
    }

    #[test]
    fn test_blank_org_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header((ORG_ID_HEADER, "   "))
            .to_http_request();
        assert!(OrgContext::from_http_request(&req).is_err());
    }

    #[test]
    fn test_overlong_org_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header((ORG_ID_HEADER, "x".repeat(256)))
            .to_http_request();
        assert!(OrgContext::from_http_request(&req).is_err());
    }

    #[test]
    fn test_client_header_is_optional() {
        let req = TestRequest::default()
            .insert_header((ORG_ID_HEADER, "org-1"))
            .to_http_request();
        let ctx = OrgContext::from_http_request(&req).unwrap();
        assert!(ctx.client_id.is_none());
    }
}
