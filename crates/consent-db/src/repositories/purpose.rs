//! Purpose catalog repository
//!
//! The consent core only resolves purposes by name; catalog administration
//! lives elsewhere. `create` exists for seeding and tests.

use crate::entities::consent_purpose as purpose;
use crate::error::Result;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

#[derive(Debug, Clone, Copy, Default)]
pub struct PurposeRepository;

impl PurposeRepository {
    pub async fn get_by_name<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        name: &str,
    ) -> Result<Option<purpose::Model>> {
        purpose::Entity::find()
            .filter(purpose::Column::OrgId.eq(org_id))
            .filter(purpose::Column::Name.eq(name))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub async fn get_by_names<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        names: &[String],
    ) -> Result<Vec<purpose::Model>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        purpose::Entity::find()
            .filter(purpose::Column::OrgId.eq(org_id))
            .filter(purpose::Column::Name.is_in(names.to_vec()))
            .all(db)
            .await
            .map_err(Into::into)
    }

    pub async fn create<C: ConnectionTrait>(&self, db: &C, model: &purpose::Model) -> Result<()> {
        let active = purpose::ActiveModel {
            purpose_id: Set(model.purpose_id.clone()),
            org_id: Set(model.org_id.clone()),
            name: Set(model.name.clone()),
            description: Set(model.description.clone()),
            purpose_type: Set(model.purpose_type.clone()),
            attributes: Set(model.attributes.clone()),
        };

        purpose::Entity::insert(active).exec_without_returning(db).await?;
        Ok(())
    }
}
