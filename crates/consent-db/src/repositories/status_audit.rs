//! Status audit repository
//!
//! Append-only: rows are created and read, never updated; deletion only
//! happens as part of a consent hard-delete cascade.

use crate::entities::consent_status_audit as audit;
use crate::error::Result;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusAuditRepository;

impl StatusAuditRepository {
    pub async fn create<C: ConnectionTrait>(&self, db: &C, model: &audit::Model) -> Result<()> {
        let active = audit::ActiveModel {
            status_audit_id: Set(model.status_audit_id.clone()),
            org_id: Set(model.org_id.clone()),
            consent_id: Set(model.consent_id.clone()),
            previous_status: Set(model.previous_status.clone()),
            current_status: Set(model.current_status.clone()),
            action_time: Set(model.action_time),
            reason: Set(model.reason.clone()),
            action_by: Set(model.action_by.clone()),
        };

        audit::Entity::insert(active).exec_without_returning(db).await?;
        Ok(())
    }

    /// Audit trail of one consent, newest first.
    pub async fn get_by_consent_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Vec<audit::Model>> {
        audit::Entity::find()
            .filter(audit::Column::OrgId.eq(org_id))
            .filter(audit::Column::ConsentId.eq(consent_id))
            .order_by_desc(audit::Column::ActionTime)
            .all(db)
            .await
            .map_err(Into::into)
    }

    pub async fn get_latest<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Option<audit::Model>> {
        audit::Entity::find()
            .filter(audit::Column::OrgId.eq(org_id))
            .filter(audit::Column::ConsentId.eq(consent_id))
            .order_by_desc(audit::Column::ActionTime)
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_by_consent_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<()> {
        audit::Entity::delete_many()
            .filter(audit::Column::OrgId.eq(org_id))
            .filter(audit::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }
}
