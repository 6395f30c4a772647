//! Service layer: the consent state engine
//!
//! Each service owns one slice of the write pipeline and runs every
//! multi-step mutation inside a single database transaction; an audit row is
//! only ever written alongside a committed status change.

pub mod auth_resource;
pub mod consent;
pub mod purpose_catalog;
pub mod validation;

pub use auth_resource::{AuthResourceService, ParentConsentStore};
pub use consent::ConsentService;
pub use purpose_catalog::{DbPurposeCatalog, PurposeCatalog, PurposeDefinition};
pub use validation::ValidationService;

use consent_core::errors::{ConsentError, ConsentResult};
use consent_core::model::AuthorizationResponse;
use consent_db::entities::{consent_auth_resource, consent_status_audit};
use serde_json::Value;

/// Current time in epoch milliseconds (consent timestamps)
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current time in epoch seconds (validity window comparisons)
pub(crate) fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Fresh opaque identifier
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse a serialized JSON column back into an object, defaulting to `{}`.
pub(crate) fn parse_json_object(raw: Option<&str>) -> Value {
    raw.and_then(|s| serde_json::from_str::<Value>(s).ok())
        .filter(|v| v.is_object())
        .unwrap_or_else(|| serde_json::json!({}))
}

/// Serialize an optional JSON value for storage as an opaque string column.
pub(crate) fn serialize_json(value: &Option<Value>) -> ConsentResult<Option<String>> {
    match value {
        Some(v) => serde_json::to_string(v)
            .map(Some)
            .map_err(|e| ConsentError::validation(format!("failed to serialize payload: {}", e))),
        None => Ok(None),
    }
}

/// Wire shape of one authorization row
pub(crate) fn auth_response(model: &consent_auth_resource::Model) -> AuthorizationResponse {
    AuthorizationResponse {
        id: model.auth_id.clone(),
        auth_type: model.auth_type.clone(),
        status: model.auth_status.clone(),
        user_id: model.user_id.clone(),
        updated_time: model.updated_time,
        resources: parse_json_object(model.resources.as_deref()),
    }
}

/// Build an audit row for a committed status transition.
pub(crate) fn audit_row(
    org_id: &str,
    consent_id: &str,
    previous_status: &str,
    current_status: &str,
    reason: &str,
    action_by: Option<String>,
    action_time: i64,
) -> consent_status_audit::Model {
    consent_status_audit::Model {
        status_audit_id: new_id(),
        org_id: org_id.to_string(),
        consent_id: consent_id.to_string(),
        previous_status: previous_status.to_string(),
        current_status: current_status.to_string(),
        action_time,
        reason: reason.to_string(),
        action_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_object_defaults_to_empty() {
        assert_eq!(parse_json_object(None), serde_json::json!({}));
        assert_eq!(parse_json_object(Some("not json")), serde_json::json!({}));
        assert_eq!(parse_json_object(Some("[1,2]")), serde_json::json!({}));
        assert_eq!(
            parse_json_object(Some(r#"{"accounts":["a1"]}"#)),
            serde_json::json!({"accounts": ["a1"]})
        );
    }

    #[test]
    fn test_serialize_json_round_trip() {
        let value = Some(serde_json::json!({"k": "v"}));
        let raw = serialize_json(&value).unwrap().unwrap();
        assert_eq!(parse_json_object(Some(&raw)), serde_json::json!({"k": "v"}));

        assert!(serialize_json(&None).unwrap().is_none());
    }
}
