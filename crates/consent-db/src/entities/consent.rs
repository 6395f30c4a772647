//! Consent aggregate root entity

use consent_core::ConsentStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub consent_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub org_id: String,

    pub client_id: String,
    pub consent_type: String,
    pub current_status: String,

    pub consent_frequency: Option<i32>,

    /// Epoch seconds; absent means the consent never expires
    pub validity_time: Option<i64>,

    pub recurring_indicator: Option<bool>,
    pub data_access_validity_duration: Option<i64>,

    /// Opaque serialized receipt payload
    #[sea_orm(column_type = "Text", nullable)]
    pub receipt: Option<String>,

    /// Epoch milliseconds
    pub created_time: i64,
    pub updated_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::consent_auth_resource::Entity")]
    AuthResources,

    #[sea_orm(has_many = "super::consent_status_audit::Entity")]
    StatusAudits,

    #[sea_orm(has_many = "super::consent_purpose_mapping::Entity")]
    PurposeMappings,
}

impl Related<super::consent_auth_resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthResources.def()
    }
}

impl Related<super::consent_status_audit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusAudits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Get the parsed consent status, if the stored token is canonical
    pub fn status(&self) -> Option<ConsentStatus> {
        ConsentStatus::parse(&self.current_status)
    }

    /// Whether the stored status is terminal (sticky)
    pub fn is_terminal(&self) -> bool {
        self.status().map(|s| s.is_terminal()).unwrap_or(false)
    }

    /// Whether the validity window has elapsed at the given epoch second.
    /// Only `ACTIVE` consents are eligible for expiry materialization.
    pub fn is_expiry_due(&self, now_seconds: i64) -> bool {
        match self.validity_time {
            Some(validity) => {
                self.status() == Some(ConsentStatus::Active) && now_seconds > validity
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(status: &str, validity: Option<i64>) -> Model {
        Model {
            consent_id: "c1".to_string(),
            org_id: "org1".to_string(),
            client_id: "app".to_string(),
            consent_type: "accounts".to_string(),
            current_status: status.to_string(),
            consent_frequency: None,
            validity_time: validity,
            recurring_indicator: None,
            data_access_validity_duration: None,
            receipt: None,
            created_time: 0,
            updated_time: 0,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(model("ACTIVE", None).status(), Some(ConsentStatus::Active));
        assert_eq!(model("bogus", None).status(), None);
    }

    #[test]
    fn test_terminal_detection() {
        assert!(model("REVOKED", None).is_terminal());
        assert!(model("EXPIRED", None).is_terminal());
        assert!(!model("ACTIVE", None).is_terminal());
    }

    #[test]
    fn test_expiry_eligibility() {
        // active + elapsed window
        assert!(model("ACTIVE", Some(100)).is_expiry_due(101));
        // window not yet elapsed
        assert!(!model("ACTIVE", Some(100)).is_expiry_due(100));
        // no validity window
        assert!(!model("ACTIVE", None).is_expiry_due(i64::MAX));
        // only ACTIVE is eligible
        assert!(!model("CREATED", Some(100)).is_expiry_due(101));
        assert!(!model("REVOKED", Some(100)).is_expiry_due(101));
    }
}
