//! Authorization resource entity
//!
//! A per-user (or client-only) grant under one consent. Its `auth_status`
//! sub-state drives consent status derivation.

use consent_core::AuthState;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent_auth_resource")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub auth_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub org_id: String,

    pub consent_id: String,
    pub auth_type: String,

    /// Nullable for client-only grants
    pub user_id: Option<String>,

    pub auth_status: String,

    /// Serialized JSON object of resource coordinates
    #[sea_orm(column_type = "Text", nullable)]
    pub resources: Option<String>,

    /// Epoch milliseconds
    pub updated_time: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::consent::Entity",
        from = "Column::ConsentId",
        to = "super::consent::Column::ConsentId"
    )]
    Consent,
}

impl Related<super::consent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parse the stored sub-state; unknown strings become custom states
    pub fn state(&self) -> AuthState {
        AuthState::parse(&self.auth_status)
    }

    /// Reconciliation identity within one consent
    pub fn identity(&self) -> (Option<&str>, &str) {
        (self.user_id.as_deref(), self.auth_type.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        let model = Model {
            auth_id: "a1".to_string(),
            org_id: "org1".to_string(),
            consent_id: "c1".to_string(),
            auth_type: "authorization_code".to_string(),
            user_id: Some("u1".to_string()),
            auth_status: "sys_expired".to_string(),
            resources: None,
            updated_time: 0,
        };
        assert_eq!(model.state(), AuthState::SysExpired);
        assert_eq!(model.identity(), (Some("u1"), "authorization_code"));
    }
}
