//! HTTP request handlers

pub mod auth_resource;
pub mod consent;
pub mod consent_file;
pub mod health;
pub mod validate;
