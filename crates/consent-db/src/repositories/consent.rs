//! Consent repository

use crate::entities::consent;
use crate::error::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Unchanged,
};

/// Search filter for consent lookups within one org.
///
/// Empty vectors mean "no constraint on this field". A non-positive `limit`
/// falls back to 20, a negative `offset` to 0.
#[derive(Debug, Clone, Default)]
pub struct ConsentSearchFilter {
    pub consent_ids: Vec<String>,
    pub consent_types: Vec<String>,
    pub consent_statuses: Vec<String>,
    pub client_ids: Vec<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ConsentSearchFilter {
    pub const DEFAULT_LIMIT: u64 = 20;

    pub fn effective_limit(&self) -> u64 {
        if self.limit <= 0 {
            Self::DEFAULT_LIMIT
        } else {
            self.limit as u64
        }
    }

    pub fn effective_offset(&self) -> u64 {
        if self.offset < 0 {
            0
        } else {
            self.offset as u64
        }
    }
}

/// Repository for the consent aggregate root
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsentRepository;

impl ConsentRepository {
    pub async fn create<C: ConnectionTrait>(&self, db: &C, model: &consent::Model) -> Result<()> {
        let active = consent::ActiveModel {
            consent_id: Set(model.consent_id.clone()),
            org_id: Set(model.org_id.clone()),
            client_id: Set(model.client_id.clone()),
            consent_type: Set(model.consent_type.clone()),
            current_status: Set(model.current_status.clone()),
            consent_frequency: Set(model.consent_frequency),
            validity_time: Set(model.validity_time),
            recurring_indicator: Set(model.recurring_indicator),
            data_access_validity_duration: Set(model.data_access_validity_duration),
            receipt: Set(model.receipt.clone()),
            created_time: Set(model.created_time),
            updated_time: Set(model.updated_time),
        };

        consent::Entity::insert(active)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn get_by_id<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Option<consent::Model>> {
        consent::Entity::find()
            .filter(consent::Column::OrgId.eq(org_id))
            .filter(consent::Column::ConsentId.eq(consent_id))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Read the consent row for a status-changing update.
    ///
    /// On postgres this takes an exclusive row lock (`SELECT … FOR UPDATE`);
    /// sqlite serialises writers, so the plain read keeps the same invariant.
    pub async fn get_for_update<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Option<consent::Model>> {
        let mut query = consent::Entity::find()
            .filter(consent::Column::OrgId.eq(org_id))
            .filter(consent::Column::ConsentId.eq(consent_id));

        if db.get_database_backend() == DatabaseBackend::Postgres {
            query = query.lock_exclusive();
        }

        query.one(db).await.map_err(Into::into)
    }

    /// Full field refresh except ids and `created_time`. The caller must
    /// have loaded the row beforehand; updating an absent row is a storage
    /// error, not a not-found signal.
    pub async fn update<C: ConnectionTrait>(&self, db: &C, model: &consent::Model) -> Result<()> {
        let active = consent::ActiveModel {
            consent_id: Unchanged(model.consent_id.clone()),
            org_id: Unchanged(model.org_id.clone()),
            client_id: Set(model.client_id.clone()),
            consent_type: Set(model.consent_type.clone()),
            current_status: Set(model.current_status.clone()),
            consent_frequency: Set(model.consent_frequency),
            validity_time: Set(model.validity_time),
            recurring_indicator: Set(model.recurring_indicator),
            data_access_validity_duration: Set(model.data_access_validity_duration),
            receipt: Set(model.receipt.clone()),
            created_time: Unchanged(model.created_time),
            updated_time: Set(model.updated_time),
        };

        active.update(db).await?;
        Ok(())
    }

    pub async fn update_status<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
        status: &str,
        updated_time: i64,
    ) -> Result<()> {
        consent::Entity::update_many()
            .col_expr(consent::Column::CurrentStatus, Expr::value(status))
            .col_expr(consent::Column::UpdatedTime, Expr::value(updated_time))
            .filter(consent::Column::OrgId.eq(org_id))
            .filter(consent::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<()> {
        consent::Entity::delete_many()
            .filter(consent::Column::OrgId.eq(org_id))
            .filter(consent::Column::ConsentId.eq(consent_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn exists<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        consent_id: &str,
    ) -> Result<bool> {
        let count = consent::Entity::find()
            .filter(consent::Column::OrgId.eq(org_id))
            .filter(consent::Column::ConsentId.eq(consent_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Filtered page of consents plus the unpaged total.
    pub async fn search<C: ConnectionTrait>(
        &self,
        db: &C,
        org_id: &str,
        filter: &ConsentSearchFilter,
    ) -> Result<(Vec<consent::Model>, u64)> {
        let mut query = consent::Entity::find().filter(consent::Column::OrgId.eq(org_id));

        if !filter.consent_ids.is_empty() {
            query = query.filter(consent::Column::ConsentId.is_in(filter.consent_ids.clone()));
        }
        if !filter.consent_types.is_empty() {
            query = query.filter(consent::Column::ConsentType.is_in(filter.consent_types.clone()));
        }
        if !filter.consent_statuses.is_empty() {
            query =
                query.filter(consent::Column::CurrentStatus.is_in(filter.consent_statuses.clone()));
        }
        if !filter.client_ids.is_empty() {
            query = query.filter(consent::Column::ClientId.is_in(filter.client_ids.clone()));
        }

        let total = query.clone().count(db).await?;

        let rows = query
            .order_by_desc(consent::Column::UpdatedTime)
            .limit(filter.effective_limit())
            .offset(filter.effective_offset())
            .all(db)
            .await?;

        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_limit_defaults() {
        let filter = ConsentSearchFilter::default();
        assert_eq!(filter.effective_limit(), 20);
        assert_eq!(filter.effective_offset(), 0);

        let filter = ConsentSearchFilter {
            limit: -5,
            offset: -3,
            ..Default::default()
        };
        assert_eq!(filter.effective_limit(), 20);
        assert_eq!(filter.effective_offset(), 0);

        let filter = ConsentSearchFilter {
            limit: 50,
            offset: 10,
            ..Default::default()
        };
        assert_eq!(filter.effective_limit(), 50);
        assert_eq!(filter.effective_offset(), 10);
    }
}
