//! SeaORM entity models for the consent schema
//!
//! Every table carries `org_id` as part of its key; queries must always
//! filter by it so that an org mismatch is indistinguishable from an absent
//! row.

pub mod consent;
pub mod consent_attribute;
pub mod consent_auth_resource;
pub mod consent_file;
pub mod consent_purpose;
pub mod consent_purpose_mapping;
pub mod consent_status_audit;

// Common imports for all entities
pub use sea_orm::entity::prelude::*;
pub use sea_orm::{NotSet, Set, Unchanged};
