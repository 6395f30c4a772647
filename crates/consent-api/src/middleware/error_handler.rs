use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse, ResponseError,
};
use consent_core::ConsentError;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use tracing::error;

/// Error response envelope returned by every non-2xx endpoint
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    pub fn new(error: String, message: String, code: String) -> Self {
        Self {
            error,
            message,
            code,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn internal_server_error() -> Self {
        Self::new(
            "Internal Server Error".to_string(),
            "An unexpected error occurred".to_string(),
            "INTERNAL_ERROR".to_string(),
        )
    }

    pub fn bad_request(message: String) -> Self {
        Self::new(
            "Bad Request".to_string(),
            message,
            "BAD_REQUEST".to_string(),
        )
    }

    pub fn not_found(message: String) -> Self {
        Self::new("Not Found".to_string(), message, "NOT_FOUND".to_string())
    }

    pub fn conflict(message: String) -> Self {
        Self::new("Conflict".to_string(), message, "CONFLICT".to_string())
    }
}

/// Global error handler middleware: logs failed requests with their id
pub struct ErrorHandler;

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorHandlerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let request_id = req
                .extensions()
                .get::<super::request_id::RequestIdValue>()
                .map(|id| id.0.clone());

            match service.call(req).await {
                Ok(res) => Ok(res),
                Err(err) => {
                    error!(
                        request_id = ?request_id,
                        error = %err,
                        "Request failed with error"
                    );
                    Err(err)
                }
            }
        })
    }
}

/// Application-level errors mapped onto HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_response = match self {
            ApiError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            ApiError::NotFound(msg) => ErrorResponse::not_found(msg.clone()),
            ApiError::Conflict(msg) => ErrorResponse::conflict(msg.clone()),
            // full cause is logged, never returned
            ApiError::Database(_) | ApiError::Internal(_) => {
                ErrorResponse::internal_server_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

impl From<ConsentError> for ApiError {
    fn from(err: ConsentError) -> Self {
        match err {
            ConsentError::InvalidRequest(msg) | ConsentError::Validation(msg) => {
                ApiError::BadRequest(msg)
            }
            ConsentError::NotFound { resource, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource, id))
            }
            ConsentError::Conflict(msg) => ApiError::Conflict(msg),
            ConsentError::Database(msg) => {
                error!(cause = %msg, "database failure surfaced to API layer");
                ApiError::Database(msg)
            }
            ConsentError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<consent_db::DatabaseError> for ApiError {
    fn from(err: consent_db::DatabaseError) -> Self {
        error!(cause = %err, "database failure surfaced to API layer");
        ApiError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let consent_error: ConsentError = errors.into();
        consent_error.into()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Database("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_consent_error_mapping() {
        let err: ApiError = ConsentError::invalid_request("bad purposes").into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = ConsentError::not_found("Consent", "c1").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = ConsentError::database("connection lost").into();
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn test_database_errors_hide_their_cause() {
        let err = ApiError::Database("password authentication failed".to_string());
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // the body builder never embeds the cause
        let envelope = ErrorResponse::internal_server_error();
        assert_eq!(envelope.message, "An unexpected error occurred");
    }
}
