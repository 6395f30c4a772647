//! Authorization resource service
//!
//! Manages individual authorization rows under an existing consent. Status
//! changes re-derive the parent consent status inside the same transaction,
//! subject to the terminal-stickiness rule. The parent is reached through a
//! narrow collaborator interface rather than the full aggregate service, so
//! the consent/authorization dependency stays one-directional.

use crate::headers::OrgContext;
use crate::logging::events;
use crate::services::{audit_row, auth_response, new_id, now_millis, serialize_json};
use async_trait::async_trait;
use consent_core::errors::{ConsentError, ConsentResult};
use consent_core::model::{AuthorizationItem, AuthorizationResponse};
use consent_core::validation::{validate_authorization_item, validate_identifier};
use consent_core::{derive_with_resolver, AuthState, CustomStateResolver};
use consent_db::entities::{consent, consent_auth_resource as auth_entity};
use consent_db::repositories::{AuthResourceRepository, ConsentRepository, StatusAuditRepository};
use consent_db::DatabaseError;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::sync::Arc;

/// Narrow view of the parent consent used during re-derivation.
#[async_trait]
pub trait ParentConsentStore: Send + Sync {
    async fn get_for_update(
        &self,
        txn: &DatabaseTransaction,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Option<consent::Model>, DatabaseError>;

    async fn update_status(
        &self,
        txn: &DatabaseTransaction,
        org_id: &str,
        consent_id: &str,
        status: &str,
        updated_time: i64,
    ) -> Result<(), DatabaseError>;
}

#[async_trait]
impl ParentConsentStore for ConsentRepository {
    async fn get_for_update(
        &self,
        txn: &DatabaseTransaction,
        org_id: &str,
        consent_id: &str,
    ) -> Result<Option<consent::Model>, DatabaseError> {
        ConsentRepository::get_for_update(self, txn, org_id, consent_id).await
    }

    async fn update_status(
        &self,
        txn: &DatabaseTransaction,
        org_id: &str,
        consent_id: &str,
        status: &str,
        updated_time: i64,
    ) -> Result<(), DatabaseError> {
        ConsentRepository::update_status(self, txn, org_id, consent_id, status, updated_time).await
    }
}

/// Payload for a partial authorization update
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorizationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<serde_json::Value>,
}

pub struct AuthResourceService {
    db: Arc<DatabaseConnection>,
    parent: Arc<dyn ParentConsentStore>,
    resolver: Arc<dyn CustomStateResolver>,
    auth_resources: AuthResourceRepository,
    audits: StatusAuditRepository,
}

impl AuthResourceService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        parent: Arc<dyn ParentConsentStore>,
        resolver: Arc<dyn CustomStateResolver>,
    ) -> Self {
        Self {
            db,
            parent,
            resolver,
            auth_resources: AuthResourceRepository,
            audits: StatusAuditRepository,
        }
    }

    /// Create one authorization under an existing consent and re-derive the
    /// parent status in the same transaction.
    pub async fn create(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        item: AuthorizationItem,
    ) -> ConsentResult<AuthorizationResponse> {
        validate_authorization_item(&item)?;
        validate_identifier(consent_id, "consentId")?;

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        let parent = self
            .parent
            .get_for_update(&txn, &ctx.org_id, consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", consent_id))?;

        let now = now_millis();
        let model = auth_entity::Model {
            auth_id: new_id(),
            org_id: ctx.org_id.clone(),
            consent_id: consent_id.to_string(),
            auth_type: item.auth_type.clone(),
            user_id: item.user_id.clone(),
            auth_status: item.auth_status.clone(),
            resources: serialize_json(&item.resources)?,
            updated_time: now,
        };
        self.auth_resources.create(&txn, &model).await?;

        self.rederive_parent(&txn, &parent, now).await?;

        txn.commit().await.map_err(DatabaseError::from)?;

        Ok(auth_response(&model))
    }

    pub async fn get(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        auth_id: &str,
    ) -> ConsentResult<AuthorizationResponse> {
        let model = self.load_auth(&ctx.org_id, consent_id, auth_id).await?;
        Ok(auth_response(&model))
    }

    pub async fn get_by_consent(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
    ) -> ConsentResult<Vec<AuthorizationResponse>> {
        let rows = self
            .auth_resources
            .get_by_consent_id(&*self.db, &ctx.org_id, consent_id)
            .await?;
        Ok(rows.iter().map(auth_response).collect())
    }

    pub async fn get_by_user(
        &self,
        ctx: &OrgContext,
        user_id: &str,
    ) -> ConsentResult<Vec<AuthorizationResponse>> {
        validate_identifier(user_id, "userId")?;
        let rows = self
            .auth_resources
            .get_by_user_id(&*self.db, &ctx.org_id, user_id)
            .await?;
        Ok(rows.iter().map(auth_response).collect())
    }

    /// Update one authorization. A status change re-derives the parent
    /// consent status within the same transaction.
    pub async fn update(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        auth_id: &str,
        request: UpdateAuthorizationRequest,
    ) -> ConsentResult<AuthorizationResponse> {
        if let Some(status) = &request.status {
            if status.trim().is_empty() {
                return Err(ConsentError::invalid_request(
                    "authorization status is required",
                ));
            }
        }

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        let parent = self
            .parent
            .get_for_update(&txn, &ctx.org_id, consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", consent_id))?;

        let existing = self
            .auth_resources
            .get_by_id(&txn, &ctx.org_id, auth_id)
            .await?
            .filter(|a| a.consent_id == consent_id)
            .ok_or_else(|| ConsentError::not_found("Authorization", auth_id))?;

        let now = now_millis();
        let new_status = request
            .status
            .clone()
            .unwrap_or_else(|| existing.auth_status.clone());
        let status_changed = new_status != existing.auth_status;

        let model = auth_entity::Model {
            auth_status: new_status,
            resources: match &request.resources {
                Some(_) => serialize_json(&request.resources)?,
                None => existing.resources.clone(),
            },
            updated_time: now,
            ..existing
        };
        self.auth_resources.update(&txn, &model).await?;

        if status_changed {
            self.rederive_parent(&txn, &parent, now).await?;
        }

        txn.commit().await.map_err(DatabaseError::from)?;

        Ok(auth_response(&model))
    }

    /// Fast path: update only the authorization's status and timestamp.
    /// Deliberately does NOT touch the parent consent.
    pub async fn update_status(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        auth_id: &str,
        status: &str,
    ) -> ConsentResult<AuthorizationResponse> {
        if status.trim().is_empty() {
            return Err(ConsentError::invalid_request(
                "authorization status is required",
            ));
        }

        let mut existing = self.load_auth(&ctx.org_id, consent_id, auth_id).await?;

        let now = now_millis();
        self.auth_resources
            .update_status(&*self.db, &ctx.org_id, auth_id, status, now)
            .await?;

        existing.auth_status = status.to_string();
        existing.updated_time = now;
        Ok(auth_response(&existing))
    }

    /// Bulk-set every authorization of one consent to a given status in one
    /// transaction. The parent status is the caller's responsibility.
    pub async fn update_all_status(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        status: &str,
    ) -> ConsentResult<Vec<AuthorizationResponse>> {
        if status.trim().is_empty() {
            return Err(ConsentError::invalid_request(
                "authorization status is required",
            ));
        }

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        self.parent
            .get_for_update(&txn, &ctx.org_id, consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", consent_id))?;

        let now = now_millis();
        self.auth_resources
            .update_all_status_by_consent_id(&txn, &ctx.org_id, consent_id, status, now)
            .await?;

        let rows = self
            .auth_resources
            .get_by_consent_id(&txn, &ctx.org_id, consent_id)
            .await?;

        txn.commit().await.map_err(DatabaseError::from)?;

        Ok(rows.iter().map(auth_response).collect())
    }

    /// Delete one authorization and re-derive the parent from the remaining
    /// bag within the same transaction.
    pub async fn delete(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        auth_id: &str,
    ) -> ConsentResult<()> {
        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        let parent = self
            .parent
            .get_for_update(&txn, &ctx.org_id, consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", consent_id))?;

        let existing = self
            .auth_resources
            .get_by_id(&txn, &ctx.org_id, auth_id)
            .await?
            .filter(|a| a.consent_id == consent_id)
            .ok_or_else(|| ConsentError::not_found("Authorization", auth_id))?;

        self.auth_resources
            .delete(&txn, &ctx.org_id, &existing.auth_id)
            .await?;

        let now = now_millis();
        self.rederive_parent(&txn, &parent, now).await?;

        txn.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn load_auth(
        &self,
        org_id: &str,
        consent_id: &str,
        auth_id: &str,
    ) -> ConsentResult<auth_entity::Model> {
        self.auth_resources
            .get_by_id(&*self.db, org_id, auth_id)
            .await?
            .filter(|a| a.consent_id == consent_id)
            .ok_or_else(|| ConsentError::not_found("Authorization", auth_id))
    }

    /// Re-derive the parent consent status from the current bag of child
    /// states; terminal parents are never touched, and an audit row is only
    /// written when the status actually changes.
    async fn rederive_parent(
        &self,
        txn: &DatabaseTransaction,
        parent: &consent::Model,
        now: i64,
    ) -> ConsentResult<()> {
        if parent.is_terminal() {
            return Ok(());
        }

        let auths = self
            .auth_resources
            .get_by_consent_id(txn, &parent.org_id, &parent.consent_id)
            .await?;
        let states: Vec<AuthState> = auths.iter().map(|a| a.state()).collect();

        let derived = derive_with_resolver(&states, parent.status(), self.resolver.as_ref());
        if derived.as_str() == parent.current_status {
            return Ok(());
        }

        self.parent
            .update_status(txn, &parent.org_id, &parent.consent_id, derived.as_str(), now)
            .await?;

        let audit = audit_row(
            &parent.org_id,
            &parent.consent_id,
            &parent.current_status,
            derived.as_str(),
            "authorization status changed",
            None,
            now,
        );
        self.audits.create(txn, &audit).await?;

        events::consent_status_changed(
            &parent.org_id,
            &parent.consent_id,
            &parent.current_status,
            derived.as_str(),
            "authorization status changed",
        );

        Ok(())
    }
}
