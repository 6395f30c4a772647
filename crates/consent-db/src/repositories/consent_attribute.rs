//! Consent attribute repository
//!
//! Attributes are replaced as a whole set; there is no per-key update.

use crate::entities::consent_attribute as attribute;
use crate::error::Result;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsentAttributeRepository;

impl ConsentAttributeRepository {
    /// Delete-all then insert-all within the caller's transaction.
    pub async fn replace_all<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.delete_all(db, org_id, consent_id).await?;

        if attributes.is_empty() {
            return Ok(());
        }

        let rows: Vec<attribute::ActiveModel> = attributes
            .iter()
            .map(|(key, value)| attribute::ActiveModel {
                consent_id: Set(consent_id.to_string()),
                org_id: Set(org_id.to_string()),
                attr_key: Set(key.clone()),
                attr_value: Set(value.clone()),
            })
            .collect();

        attribute::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn get_all<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<BTreeMap<String, String>> {
        let rows = attribute::Entity::find()
            .filter(attribute::Column::OrgId.eq(org_id))
            .filter(attribute::Column::ConsentId.eq(consent_id))
            .order_by_asc(attribute::Column::AttrKey)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.attr_key, row.attr_value))
            .collect())
    }

    pub async fn delete_all<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<()> {
        attribute::Entity::delete_many()
            .filter(attribute::Column::OrgId.eq(org_id))
            .filter(attribute::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
