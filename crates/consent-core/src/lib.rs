//! # Consent Core
//!
//! Core domain logic for the consent management service: status sets and the
//! pure derivation function, request/response models, business-rule
//! validation, and the shared error taxonomy.
//!
//! This crate has no persistence or HTTP dependencies; the `consent-db` and
//! `consent-api` crates build on top of it.

pub mod errors;
pub mod model;
pub mod status;
pub mod validation;

// Re-export commonly used types
pub use errors::{ConsentError, ConsentResult, ErrorCategory};
pub use status::{
    derive_consent_status, derive_with_resolver, AuthState, ConsentStatus, CustomStateResolver,
    PassthroughResolver,
};

/// Maximum length accepted for consent, authorization, and organization ids.
pub const MAX_ID_LENGTH: usize = 255;
