//! Authorization resource repository

use crate::entities::consent_auth_resource as auth;
use crate::error::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, Unchanged,
};

/// Repository for individual authorization rows
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthResourceRepository;

impl AuthResourceRepository {
    pub async fn create<C: ConnectionTrait>(&self, db: &C, model: &auth::Model) -> Result<()> {
        let active = auth::ActiveModel {
            auth_id: Set(model.auth_id.clone()),
            org_id: Set(model.org_id.clone()),
            consent_id: Set(model.consent_id.clone()),
            auth_type: Set(model.auth_type.clone()),
            user_id: Set(model.user_id.clone()),
            auth_status: Set(model.auth_status.clone()),
            resources: Set(model.resources.clone()),
            updated_time: Set(model.updated_time),
        };

        auth::Entity::insert(active).exec_without_returning(db).await?;
        Ok(())
    }

    pub async fn get_by_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        auth_id: &str,
    ) -> Result<Option<auth::Model>> {
        auth::Entity::find()
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::AuthId.eq(auth_id))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub async fn get_by_consent_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Vec<auth::Model>> {
        auth::Entity::find()
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::ConsentId.eq(consent_id))
            .order_by_asc(auth::Column::AuthId)
            .all(db)
            .await
            .map_err(Into::into)
    }

    pub async fn get_by_user_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        user_id: &str,
    ) -> Result<Vec<auth::Model>> {
        auth::Entity::find()
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::UserId.eq(user_id))
            .order_by_desc(auth::Column::UpdatedTime)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Full refresh of one authorization except its ids and parent.
    pub async fn update<C: ConnectionTrait>(&self, db: &C, model: &auth::Model) -> Result<()> {
        let active = auth::ActiveModel {
            auth_id: Unchanged(model.auth_id.clone()),
            org_id: Unchanged(model.org_id.clone()),
            consent_id: Unchanged(model.consent_id.clone()),
            auth_type: Set(model.auth_type.clone()),
            user_id: Set(model.user_id.clone()),
            auth_status: Set(model.auth_status.clone()),
            resources: Set(model.resources.clone()),
            updated_time: Set(model.updated_time),
        };

        active.update(db).await?;
        Ok(())
    }

    pub async fn update_status<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        auth_id: &str,
        status: &str,
        updated_time: i64,
    ) -> Result<()> {
        auth::Entity::update_many()
            .col_expr(auth::Column::AuthStatus, Expr::value(status))
            .col_expr(auth::Column::UpdatedTime, Expr::value(updated_time))
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::AuthId.eq(auth_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Bulk-set every authorization of one consent to the given status.
    pub async fn update_all_status_by_consent_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
        status: &str,
        updated_time: i64,
    ) -> Result<()> {
        auth::Entity::update_many()
            .col_expr(auth::Column::AuthStatus, Expr::value(status))
            .col_expr(auth::Column::UpdatedTime, Expr::value(updated_time))
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        auth_id: &str,
    ) -> Result<()> {
        auth::Entity::delete_many()
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::AuthId.eq(auth_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn delete_by_consent_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<()> {
        auth::Entity::delete_many()
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn exists<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        auth_id: &str,
    ) -> Result<bool> {
        let count = auth::Entity::find()
            .filter(auth::Column::OrgId.eq(org_id))
            .filter(auth::Column::AuthId.eq(auth_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }
}
