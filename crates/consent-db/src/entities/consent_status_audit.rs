//! Append-only consent status audit entity
//!
//! One row exists for every committed consent status change; audit rows are
//! never updated and only removed when the owning consent is hard-deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent_status_audit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub status_audit_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub org_id: String,

    pub consent_id: String,

    /// Empty string sentinel on initial creation
    pub previous_status: String,

    pub current_status: String,

    /// Epoch milliseconds
    pub action_time: i64,

    pub reason: String,
    pub action_by: Option<String>,
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
