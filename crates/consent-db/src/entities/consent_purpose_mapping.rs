//! Consent/purpose mapping entity
//!
//! Binds a consent to a catalog purpose with per-mapping approval flags. The
//! purpose name is snapshotted here so reads stay self-sufficient when the
//! catalog entry disappears.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent_purpose_mapping")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub mapping_id: String,

    pub consent_id: String,
    pub org_id: String,
    pub purpose_id: String,
    pub purpose_name: String,

    pub purpose_value: Option<String>,
    pub is_user_approved: bool,
    pub is_mandatory: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::consent::Entity",
        from = "Column::ConsentId",
        to = "super::consent::Column::ConsentId"
    )]
    Consent,

    #[sea_orm(
        belongs_to = "super::consent_purpose::Entity",
        from = "Column::PurposeId",
        to = "super::consent_purpose::Column::PurposeId"
    )]
    Purpose,
}

impl Related<super::consent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consent.def()
    }
}

impl Related<super::consent_purpose::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purpose.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
