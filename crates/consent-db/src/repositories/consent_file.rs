//! Consent file repository: pass-through blob storage

use crate::entities::consent_file as file;
use crate::error::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsentFileRepository;

impl ConsentFileRepository {
    /// Insert or overwrite the blob for one consent.
    pub async fn store<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
        content: &str,
    ) -> Result<()> {
        if self.get(db, org_id, consent_id).await?.is_some() {
            file::Entity::update_many()
                .col_expr(file::Column::FileContent, Expr::value(content))
                .filter(file::Column::OrgId.eq(org_id))
                .filter(file::Column::ConsentId.eq(consent_id))
                .exec(db)
                .await?;
            return Ok(());
        }

        let active = file::ActiveModel {
            consent_id: Set(consent_id.to_string()),
            org_id: Set(org_id.to_string()),
            file_content: Set(content.to_string()),
        };

        file::Entity::insert(active).exec_without_returning(db).await?;
        Ok(())
    }

    pub async fn get<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Option<file::Model>> {
        file::Entity::find()
            .filter(file::Column::OrgId.eq(org_id))
            .filter(file::Column::ConsentId.eq(consent_id))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub async fn delete<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<()> {
        file::Entity::delete_many()
            .filter(file::Column::OrgId.eq(org_id))
            .filter(file::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
