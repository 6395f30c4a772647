//! Request and response models for the consent aggregate
//!
//! These are the wire shapes exchanged with clients. Scalar fields that are
//! absent stay absent in JSON; the purpose, attribute, and authorization
//! collections are always present, possibly empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

/// Payload for consent creation; also used verbatim as the full-replacement
/// payload on update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsentRequest {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 255, message = "consent type is required"))]
    pub consent_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_time: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_indicator: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_access_validity_duration: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,

    #[serde(default)]
    pub consent_purposes: Vec<PurposeItem>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default)]
    pub authorizations: Vec<AuthorizationItem>,
}

/// One declared purpose within a consent payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PurposeItem {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default)]
    pub is_user_approved: bool,

    #[serde(default)]
    pub is_mandatory: bool,
}

/// One authorization grant within a consent payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationItem {
    #[serde(rename = "type")]
    pub auth_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(rename = "status")]
    pub auth_status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
}

/// Full consent aggregate as returned by read endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentResponse {
    pub id: String,

    #[serde(rename = "type")]
    pub consent_type: String,

    pub status: String,
    pub client_id: String,
    pub created_time: i64,
    pub updated_time: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_time: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_indicator: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_access_validity_duration: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,

    pub consent_purpose: Vec<PurposeResponse>,
    pub attributes: BTreeMap<String, String>,
    pub authorizations: Vec<AuthorizationResponse>,
}

/// Purpose mapping enriched with catalog metadata.
///
/// `purpose_type`, `description`, and `attributes` come from the purpose
/// catalog; on a catalog miss they are empty, never an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurposeResponse {
    pub name: String,
    pub value: String,
    pub is_user_approved: bool,
    pub is_mandatory: bool,

    #[serde(rename = "type")]
    pub purpose_type: String,

    pub description: String,
    pub attributes: Value,
}

/// Authorization row as returned by read endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationResponse {
    pub id: String,

    #[serde(rename = "type")]
    pub auth_type: String,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    pub updated_time: i64,

    /// Always a JSON object, empty when nothing was stored.
    pub resources: Value,
}

/// Body of `PUT /consents/{id}/revoke`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RevokeConsentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeConsentResponse {
    pub id: String,
    pub status: String,
    pub updated_time: i64,
}

/// Body of the validation oracle endpoint.
///
/// All fields default so that a structurally empty body still deserializes;
/// presence checks happen in the service and are reported through the
/// outcome envelope, not as a 4xx.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidateConsentRequest {
    #[serde(default)]
    pub consent_id: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_params: Option<Value>,
}

/// Outcome envelope of the validation oracle; always returned with HTTP 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateConsentResponse {
    pub is_valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_information: Option<ConsentResponse>,
}

/// Canonical `errorMessage` tokens of the validation oracle
pub mod outcome {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const CONSENT_NOT_FOUND: &str = "consent_not_found";
    pub const INVALID_CONSENT_STATUS: &str = "invalid_consent_status";
    pub const CONSENT_EXPIRED: &str = "consent_expired";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

impl ValidateConsentResponse {
    pub fn valid(snapshot: ConsentResponse) -> Self {
        Self {
            is_valid: true,
            error_code: None,
            error_message: None,
            error_description: None,
            consent_information: Some(snapshot),
        }
    }

    pub fn failure(
        code: u16,
        message: &str,
        description: impl Into<String>,
        snapshot: Option<ConsentResponse>,
    ) -> Self {
        Self {
            is_valid: false,
            error_code: Some(code),
            error_message: Some(message.to_string()),
            error_description: Some(description.into()),
            consent_information: snapshot,
        }
    }
}

/// Page of consents returned by the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSearchResponse {
    pub data: Vec<ConsentResponse>,
    pub total: u64,
    pub limit: i64,
    pub offset: i64,
}

/// One committed status transition from the audit trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusAuditResponse {
    pub id: String,
    pub consent_id: String,
    pub previous_status: String,
    pub current_status: String,
    pub action_time: i64,
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_response() -> ConsentResponse {
        ConsentResponse {
            id: "c1".to_string(),
            consent_type: "accounts".to_string(),
            status: "CREATED".to_string(),
            client_id: "app-1".to_string(),
            created_time: 1_700_000_000_000,
            updated_time: 1_700_000_000_000,
            validity_time: None,
            frequency: None,
            recurring_indicator: None,
            data_access_validity_duration: None,
            receipt: None,
            consent_purpose: vec![],
            attributes: BTreeMap::new(),
            authorizations: vec![],
        }
    }

    #[test]
    fn test_optional_scalars_are_omitted_when_null() {
        let json = serde_json::to_value(minimal_response()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("validityTime"));
        assert!(!obj.contains_key("frequency"));
        assert!(!obj.contains_key("recurringIndicator"));
        assert!(!obj.contains_key("dataAccessValidityDuration"));

        // collections are always present even when empty
        assert_eq!(obj["consentPurpose"], serde_json::json!([]));
        assert_eq!(obj["attributes"], serde_json::json!({}));
        assert_eq!(obj["authorizations"], serde_json::json!([]));
    }

    #[test]
    fn test_response_uses_camel_case_keys() {
        let mut response = minimal_response();
        response.validity_time = Some(1_700_003_600);
        let json = serde_json::to_value(response).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["type"], "accounts");
        assert_eq!(obj["clientId"], "app-1");
        assert_eq!(obj["createdTime"], 1_700_000_000_000i64);
        assert_eq!(obj["validityTime"], 1_700_003_600i64);
    }

    #[test]
    fn test_create_request_deserializes_with_defaults() {
        let req: CreateConsentRequest =
            serde_json::from_str(r#"{"type":"payments"}"#).unwrap();
        assert_eq!(req.consent_type, "payments");
        assert!(req.consent_purposes.is_empty());
        assert!(req.attributes.is_empty());
        assert!(req.authorizations.is_empty());
        assert!(req.validity_time.is_none());
    }

    #[test]
    fn test_authorization_item_wire_names() {
        let item: AuthorizationItem = serde_json::from_str(
            r#"{"type":"authorization_code","userId":"u1","status":"approved","resources":{"accounts":["a1"]}}"#,
        )
        .unwrap();
        assert_eq!(item.auth_type, "authorization_code");
        assert_eq!(item.user_id.as_deref(), Some("u1"));
        assert_eq!(item.auth_status, "approved");
        assert!(item.resources.unwrap().is_object());
    }

    #[test]
    fn test_validate_request_tolerates_missing_fields() {
        let req: ValidateConsentRequest = serde_json::from_str("{}").unwrap();
        assert!(req.consent_id.is_empty());
        assert!(req.user_id.is_empty());
        assert!(req.resource_params.is_none());
    }

    #[test]
    fn test_validation_outcome_envelope() {
        let failure = ValidateConsentResponse::failure(
            404,
            outcome::CONSENT_NOT_FOUND,
            "consent does not exist",
            None,
        );
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errorCode"], 404);
        assert_eq!(json["errorMessage"], "consent_not_found");
        assert!(json.get("consentInformation").is_none());

        let ok = ValidateConsentResponse::valid(minimal_response());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["isValid"], true);
        assert!(json.get("errorCode").is_none());
        assert_eq!(json["consentInformation"]["id"], "c1");
    }
}
