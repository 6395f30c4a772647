//! # Consent API
//!
//! REST API server for the consent management service, built on Actix-web.
//! It fronts the consent state engine: aggregate writes, authorization
//! lifecycle, the validation oracle, and lazy expiry materialization.
//!
//! ## Features
//!
//! - Multi-tenant endpoints scoped by the `org-id` header
//! - Single-transaction write pipeline with an append-only status audit
//! - Health check endpoints for monitoring and load balancers
//! - Request ID tracking and structured logging
//! - CORS support and production security headers
//!
//! ## Configuration
//!
//! The server is configured through environment variables; see the
//! [`config`] module for the available options.

pub mod config;
pub mod handlers;
pub mod headers;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{ApiConfig, ConfigError};
pub use headers::OrgContext;
pub use middleware::error_handler::{ApiError, ApiResult, ErrorResponse};
pub use state::{AppState, AppStateError};

/// Version information for the API
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const API_VERSION: &str = "v1";
pub const SERVICE_NAME: &str = "Consent Management API";
