//! Consent/purpose mapping repository

use crate::entities::consent_purpose_mapping as mapping;
use crate::error::Result;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Debug, Clone, Copy, Default)]
pub struct PurposeMappingRepository;

impl PurposeMappingRepository {
    pub async fn link<C: ConnectionTrait>(&self, db: &C, model: &mapping::Model) -> Result<()> {
        let active = mapping::ActiveModel {
            mapping_id: Set(model.mapping_id.clone()),
            consent_id: Set(model.consent_id.clone()),
            org_id: Set(model.org_id.clone()),
            purpose_id: Set(model.purpose_id.clone()),
            purpose_name: Set(model.purpose_name.clone()),
            purpose_value: Set(model.purpose_value.clone()),
            is_user_approved: Set(model.is_user_approved),
            is_mandatory: Set(model.is_mandatory),
        };

        mapping::Entity::insert(active).exec_without_returning(db).await?;
        Ok(())
    }

    pub async fn get_by_consent<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Vec<mapping::Model>> {
        mapping::Entity::find()
            .filter(mapping::Column::OrgId.eq(org_id))
            .filter(mapping::Column::ConsentId.eq(consent_id))
            .order_by_asc(mapping::Column::PurposeName)
            .all(db)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_all<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<()> {
        mapping::Entity::delete_many()
            .filter(mapping::Column::OrgId.eq(org_id))
            .filter(mapping::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
