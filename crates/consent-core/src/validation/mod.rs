//! Business-rule validation for consent payloads
//!
//! Fail-fast checks run before any transaction is opened, so a rejected
//! request leaves the store untouched.

use crate::errors::{ConsentError, ConsentResult};
use crate::model::{AuthorizationItem, CreateConsentRequest, PurposeItem};
use crate::MAX_ID_LENGTH;
use std::collections::HashSet;
use validator::Validate;

/// Validate a create (or full-replacement update) payload.
pub fn validate_consent_payload(request: &CreateConsentRequest) -> ConsentResult<()> {
    request.validate()?;

    if request.consent_purposes.is_empty() {
        return Err(ConsentError::invalid_request(
            "at least one consent purpose is required",
        ));
    }

    validate_purpose_items(&request.consent_purposes)?;

    for auth in &request.authorizations {
        validate_authorization_item(auth)?;
    }

    if let Some(duration) = request.data_access_validity_duration {
        if duration < 0 {
            return Err(ConsentError::invalid_request(
                "dataAccessValidityDuration must not be negative",
            ));
        }
    }

    Ok(())
}

/// Purpose names must be unique within one request, and a mandatory purpose
/// cannot be user-disapproved.
pub fn validate_purpose_items(purposes: &[PurposeItem]) -> ConsentResult<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(purposes.len());

    for purpose in purposes {
        if purpose.name.trim().is_empty() {
            return Err(ConsentError::invalid_request("purpose name is required"));
        }
        if !seen.insert(purpose.name.as_str()) {
            return Err(ConsentError::invalid_request(format!(
                "duplicate purpose name '{}' in request",
                purpose.name
            )));
        }
        if purpose.is_mandatory && !purpose.is_user_approved {
            return Err(ConsentError::invalid_request(format!(
                "mandatory purpose '{}' cannot be user-disapproved",
                purpose.name
            )));
        }
    }

    Ok(())
}

/// Authorization items need a non-empty type and status.
pub fn validate_authorization_item(auth: &AuthorizationItem) -> ConsentResult<()> {
    if auth.auth_type.trim().is_empty() {
        return Err(ConsentError::invalid_request(
            "authorization type is required",
        ));
    }
    if auth.auth_status.trim().is_empty() {
        return Err(ConsentError::invalid_request(
            "authorization status is required",
        ));
    }
    if let Some(user_id) = &auth.user_id {
        validate_identifier(user_id, "userId")?;
    }
    Ok(())
}

/// Identifiers are bounded to keep them indexable as key columns.
pub fn validate_identifier(value: &str, field: &str) -> ConsentResult<()> {
    if value.is_empty() {
        return Err(ConsentError::invalid_request(format!(
            "{} must not be empty",
            field
        )));
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(ConsentError::invalid_request(format!(
            "{} exceeds the maximum length of {} characters",
            field, MAX_ID_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purpose(name: &str, approved: bool, mandatory: bool) -> PurposeItem {
        PurposeItem {
            name: name.to_string(),
            value: None,
            is_user_approved: approved,
            is_mandatory: mandatory,
        }
    }

    fn request_with(purposes: Vec<PurposeItem>) -> CreateConsentRequest {
        CreateConsentRequest {
            consent_type: "accounts".to_string(),
            consent_purposes: purposes,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        let request = request_with(vec![purpose("data_access", true, true)]);
        assert!(validate_consent_payload(&request).is_ok());
    }

    #[test]
    fn test_empty_purpose_list_is_rejected() {
        let request = request_with(vec![]);
        let err = validate_consent_payload(&request).unwrap_err();
        assert!(matches!(err, ConsentError::InvalidRequest(_)));
    }

    #[test]
    fn test_duplicate_purpose_names_are_rejected() {
        let request = request_with(vec![
            purpose("data_access", true, false),
            purpose("data_access", true, false),
        ]);
        let err = validate_consent_payload(&request).unwrap_err();
        assert!(err.to_string().contains("duplicate purpose name"));
    }

    #[test]
    fn test_mandatory_implies_user_approved() {
        let request = request_with(vec![purpose("data_access", false, true)]);
        let err = validate_consent_payload(&request).unwrap_err();
        assert!(err.to_string().contains("cannot be user-disapproved"));

        // not mandatory + not approved is fine
        let request = request_with(vec![purpose("data_access", false, false)]);
        assert!(validate_consent_payload(&request).is_ok());
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let mut request = request_with(vec![purpose("data_access", true, false)]);
        request.data_access_validity_duration = Some(-1);
        assert!(validate_consent_payload(&request).is_err());

        request.data_access_validity_duration = Some(0);
        assert!(validate_consent_payload(&request).is_ok());
    }

    #[test]
    fn test_empty_consent_type_is_rejected() {
        let mut request = request_with(vec![purpose("data_access", true, false)]);
        request.consent_type = String::new();
        assert!(validate_consent_payload(&request).is_err());
    }

    #[test]
    fn test_authorization_item_requires_type_and_status() {
        let mut auth = AuthorizationItem {
            auth_type: "authorization_code".to_string(),
            user_id: Some("u1".to_string()),
            auth_status: "approved".to_string(),
            resources: None,
        };
        assert!(validate_authorization_item(&auth).is_ok());

        auth.auth_status = "  ".to_string();
        assert!(validate_authorization_item(&auth).is_err());

        auth.auth_status = "approved".to_string();
        auth.auth_type = String::new();
        assert!(validate_authorization_item(&auth).is_err());
    }

    #[test]
    fn test_identifier_length_bound() {
        assert!(validate_identifier("abc", "orgId").is_ok());
        assert!(validate_identifier(&"x".repeat(255), "orgId").is_ok());
        assert!(validate_identifier(&"x".repeat(256), "orgId").is_err());
        assert!(validate_identifier("", "orgId").is_err());
    }
}
