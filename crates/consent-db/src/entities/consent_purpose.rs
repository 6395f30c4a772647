//! Purpose catalog entity
//!
//! Purpose definitions are owned by the catalog; consents reference them by
//! name at write time and snapshot the id on the mapping row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consent_purpose")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub purpose_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub org_id: String,

    /// Unique within one org
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub purpose_type: Option<String>,

    /// Free-form enrichment metadata
    pub attributes: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::consent_purpose_mapping::Entity")]
    Mappings,
}

impl Related<super::consent_purpose_mapping::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mappings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
