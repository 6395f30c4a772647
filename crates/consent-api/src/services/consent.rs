//! Consent aggregate service
//!
//! Owns the write pipeline for the full aggregate (consent, purposes,
//! attributes, authorizations, audit) and the read-side expiry
//! materialization rule. Purpose catalog lookups always happen before the
//! transaction begins; every mutation commits atomically or not at all.

use crate::headers::OrgContext;
use crate::logging::events;
use crate::services::purpose_catalog::{PurposeCatalog, PurposeDefinition};
use crate::services::{
    audit_row, auth_response, new_id, now_millis, now_seconds, serialize_json,
};
use consent_core::errors::{ConsentError, ConsentResult};
use consent_core::model::{
    ConsentResponse, ConsentSearchResponse, CreateConsentRequest, PurposeItem, PurposeResponse,
    RevokeConsentRequest, RevokeConsentResponse, StatusAuditResponse,
};
use consent_core::validation::{validate_consent_payload, validate_identifier};
use consent_core::{derive_with_resolver, AuthState, ConsentStatus, CustomStateResolver};
use consent_db::entities::{
    consent, consent_auth_resource as auth_entity, consent_purpose_mapping as mapping_entity,
};
use consent_db::repositories::{
    AuthResourceRepository, ConsentAttributeRepository, ConsentFileRepository, ConsentRepository,
    ConsentSearchFilter, PurposeMappingRepository, StatusAuditRepository,
};
use consent_db::DatabaseError;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Service driving the consent aggregate lifecycle
pub struct ConsentService {
    db: Arc<DatabaseConnection>,
    catalog: Arc<dyn PurposeCatalog>,
    resolver: Arc<dyn CustomStateResolver>,
    consents: ConsentRepository,
    attributes: ConsentAttributeRepository,
    mappings: PurposeMappingRepository,
    auth_resources: AuthResourceRepository,
    audits: StatusAuditRepository,
    files: ConsentFileRepository,
}

impl ConsentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        catalog: Arc<dyn PurposeCatalog>,
        resolver: Arc<dyn CustomStateResolver>,
    ) -> Self {
        Self {
            db,
            catalog,
            resolver,
            consents: ConsentRepository,
            attributes: ConsentAttributeRepository,
            mappings: PurposeMappingRepository,
            auth_resources: AuthResourceRepository,
            audits: StatusAuditRepository,
            files: ConsentFileRepository,
        }
    }

    /// Create a consent aggregate in one transaction.
    pub async fn create(
        &self,
        ctx: &OrgContext,
        request: CreateConsentRequest,
    ) -> ConsentResult<ConsentResponse> {
        validate_consent_payload(&request)?;
        validate_identifier(&ctx.org_id, "orgId")?;
        if let Some(client_id) = &ctx.client_id {
            validate_identifier(client_id, "clientId")?;
        }

        // catalog lookups stay outside the transaction
        let resolved = self
            .resolve_purposes(&ctx.org_id, &request.consent_purposes)
            .await?;

        let consent_id = new_id();
        let now = now_millis();

        let states: Vec<AuthState> = request
            .authorizations
            .iter()
            .map(|a| AuthState::parse(a.auth_status.trim()))
            .collect();
        let derived = derive_with_resolver(&states, None, self.resolver.as_ref());

        let consent_model = consent::Model {
            consent_id: consent_id.clone(),
            org_id: ctx.org_id.clone(),
            client_id: ctx.client_id.clone().unwrap_or_default(),
            consent_type: request.consent_type.clone(),
            current_status: derived.as_str().to_string(),
            consent_frequency: request.frequency,
            validity_time: request.validity_time,
            recurring_indicator: request.recurring_indicator,
            data_access_validity_duration: request.data_access_validity_duration,
            receipt: serialize_json(&request.receipt)?,
            created_time: now,
            updated_time: now,
        };

        let mut auth_models = Vec::with_capacity(request.authorizations.len());
        for item in &request.authorizations {
            auth_models.push(auth_entity::Model {
                auth_id: new_id(),
                org_id: ctx.org_id.clone(),
                consent_id: consent_id.clone(),
                auth_type: item.auth_type.clone(),
                user_id: item.user_id.clone(),
                auth_status: item.auth_status.clone(),
                resources: serialize_json(&item.resources)?,
                updated_time: now,
            });
        }

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        self.consents.create(&txn, &consent_model).await?;

        for (item, definition) in &resolved {
            let mapping = mapping_entity::Model {
                mapping_id: new_id(),
                consent_id: consent_id.clone(),
                org_id: ctx.org_id.clone(),
                purpose_id: definition.purpose_id.clone(),
                purpose_name: item.name.clone(),
                purpose_value: item.value.clone(),
                is_user_approved: item.is_user_approved,
                is_mandatory: item.is_mandatory,
            };
            self.mappings.link(&txn, &mapping).await?;
        }

        self.attributes
            .replace_all(&txn, &ctx.org_id, &consent_id, &request.attributes)
            .await?;

        for model in &auth_models {
            self.auth_resources.create(&txn, model).await?;
        }

        let audit = audit_row(
            &ctx.org_id,
            &consent_id,
            "",
            derived.as_str(),
            "consent created",
            None,
            now,
        );
        self.audits.create(&txn, &audit).await?;

        txn.commit().await.map_err(DatabaseError::from)?;

        events::consent_status_changed(&ctx.org_id, &consent_id, "", derived.as_str(), "consent created");

        let purposes = resolved
            .iter()
            .map(|(item, definition)| purpose_response(item, Some(definition)))
            .collect();
        Ok(response_from_parts(
            &consent_model,
            purposes,
            request.attributes.clone(),
            auth_models.iter().map(auth_response).collect(),
        ))
    }

    /// Fetch the full aggregate, materializing expiry first.
    pub async fn get(&self, ctx: &OrgContext, consent_id: &str) -> ConsentResult<ConsentResponse> {
        let consent = self
            .consents
            .get_by_id(&*self.db, &ctx.org_id, consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", consent_id))?;

        let consent = self.materialize_expiry(consent).await?;
        self.load_response(&consent).await
    }

    /// Full replacement of purposes, attributes, and authorizations; scalar
    /// fields are overwritten when present in the payload.
    pub async fn update(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        request: CreateConsentRequest,
    ) -> ConsentResult<ConsentResponse> {
        validate_consent_payload(&request)?;
        validate_identifier(consent_id, "consentId")?;

        let resolved = self
            .resolve_purposes(&ctx.org_id, &request.consent_purposes)
            .await?;

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        let existing = self
            .consents
            .get_for_update(&txn, &ctx.org_id, consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", consent_id))?;

        let now = now_millis();

        self.attributes
            .replace_all(&txn, &ctx.org_id, consent_id, &request.attributes)
            .await?;

        self.mappings.delete_all(&txn, &ctx.org_id, consent_id).await?;
        for (item, definition) in &resolved {
            let mapping = mapping_entity::Model {
                mapping_id: new_id(),
                consent_id: consent_id.to_string(),
                org_id: ctx.org_id.clone(),
                purpose_id: definition.purpose_id.clone(),
                purpose_name: item.name.clone(),
                purpose_value: item.value.clone(),
                is_user_approved: item.is_user_approved,
                is_mandatory: item.is_mandatory,
            };
            self.mappings.link(&txn, &mapping).await?;
        }

        // reconcile authorizations by (user_id, auth_type) identity
        let current_auths = self
            .auth_resources
            .get_by_consent_id(&txn, &ctx.org_id, consent_id)
            .await?;
        let mut stale: HashMap<(Option<String>, String), auth_entity::Model> = current_auths
            .into_iter()
            .map(|a| ((a.user_id.clone(), a.auth_type.clone()), a))
            .collect();

        let mut final_auths = Vec::with_capacity(request.authorizations.len());
        for item in &request.authorizations {
            let key = (item.user_id.clone(), item.auth_type.clone());
            let resources = serialize_json(&item.resources)?;

            if let Some(existing_auth) = stale.remove(&key) {
                let model = auth_entity::Model {
                    auth_status: item.auth_status.clone(),
                    resources,
                    updated_time: now,
                    ..existing_auth
                };
                self.auth_resources.update(&txn, &model).await?;
                final_auths.push(model);
            } else {
                let model = auth_entity::Model {
                    auth_id: new_id(),
                    org_id: ctx.org_id.clone(),
                    consent_id: consent_id.to_string(),
                    auth_type: item.auth_type.clone(),
                    user_id: item.user_id.clone(),
                    auth_status: item.auth_status.clone(),
                    resources,
                    updated_time: now,
                };
                self.auth_resources.create(&txn, &model).await?;
                final_auths.push(model);
            }
        }
        for model in stale.values() {
            self.auth_resources
                .delete(&txn, &ctx.org_id, &model.auth_id)
                .await?;
        }

        let states: Vec<AuthState> = final_auths.iter().map(|a| a.state()).collect();
        let new_status = match existing.status() {
            // terminal states are sticky regardless of derivation
            Some(status) if status.is_terminal() => status,
            current => derive_with_resolver(&states, current, self.resolver.as_ref()),
        };

        let updated = consent::Model {
            consent_id: existing.consent_id.clone(),
            org_id: existing.org_id.clone(),
            client_id: existing.client_id.clone(),
            consent_type: request.consent_type.clone(),
            current_status: new_status.as_str().to_string(),
            consent_frequency: request.frequency.or(existing.consent_frequency),
            validity_time: request.validity_time.or(existing.validity_time),
            recurring_indicator: request.recurring_indicator.or(existing.recurring_indicator),
            data_access_validity_duration: request
                .data_access_validity_duration
                .or(existing.data_access_validity_duration),
            receipt: match &request.receipt {
                Some(_) => serialize_json(&request.receipt)?,
                None => existing.receipt.clone(),
            },
            created_time: existing.created_time,
            updated_time: now,
        };
        self.consents.update(&txn, &updated).await?;

        let status_changed = existing.current_status != updated.current_status;
        if status_changed {
            let audit = audit_row(
                &ctx.org_id,
                consent_id,
                &existing.current_status,
                &updated.current_status,
                "consent updated",
                None,
                now,
            );
            self.audits.create(&txn, &audit).await?;
        }

        txn.commit().await.map_err(DatabaseError::from)?;

        if status_changed {
            events::consent_status_changed(
                &ctx.org_id,
                consent_id,
                &existing.current_status,
                &updated.current_status,
                "consent updated",
            );
        }

        let purposes = resolved
            .iter()
            .map(|(item, definition)| purpose_response(item, Some(definition)))
            .collect();
        Ok(response_from_parts(
            &updated,
            purposes,
            request.attributes.clone(),
            final_auths.iter().map(auth_response).collect(),
        ))
    }

    /// Revoke the consent and cascade `sys_revoked` onto every child
    /// authorization. Idempotent: a second revoke changes timestamps only.
    pub async fn revoke(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        request: RevokeConsentRequest,
    ) -> ConsentResult<RevokeConsentResponse> {
        let action_by = request
            .action_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConsentError::invalid_request("actionBy is required"))?
            .to_string();

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        let existing = self
            .consents
            .get_for_update(&txn, &ctx.org_id, consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", consent_id))?;

        let now = now_millis();
        let previous = existing.current_status.clone();
        let revoked = ConsentStatus::Revoked.as_str();

        self.consents
            .update_status(&txn, &ctx.org_id, consent_id, revoked, now)
            .await?;
        self.auth_resources
            .update_all_status_by_consent_id(
                &txn,
                &ctx.org_id,
                consent_id,
                AuthState::SYS_REVOKED,
                now,
            )
            .await?;

        let status_changed = previous != revoked;
        if status_changed {
            let reason = request
                .revocation_reason
                .clone()
                .unwrap_or_else(|| "consent revoked".to_string());
            let audit = audit_row(
                &ctx.org_id,
                consent_id,
                &previous,
                revoked,
                &reason,
                Some(action_by),
                now,
            );
            self.audits.create(&txn, &audit).await?;
        }

        txn.commit().await.map_err(DatabaseError::from)?;

        if status_changed {
            events::consent_status_changed(&ctx.org_id, consent_id, &previous, revoked, "consent revoked");
        }

        Ok(RevokeConsentResponse {
            id: consent_id.to_string(),
            status: revoked.to_string(),
            updated_time: now,
        })
    }

    /// Hard delete; cascades through every owned table.
    pub async fn delete(&self, ctx: &OrgContext, consent_id: &str) -> ConsentResult<()> {
        if !self
            .consents
            .exists(&*self.db, &ctx.org_id, consent_id)
            .await?
        {
            return Err(ConsentError::not_found("Consent", consent_id));
        }

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        self.attributes.delete_all(&txn, &ctx.org_id, consent_id).await?;
        self.mappings.delete_all(&txn, &ctx.org_id, consent_id).await?;
        self.auth_resources
            .delete_by_consent_id(&txn, &ctx.org_id, consent_id)
            .await?;
        self.audits
            .delete_by_consent_id(&txn, &ctx.org_id, consent_id)
            .await?;
        self.files.delete(&txn, &ctx.org_id, consent_id).await?;
        self.consents.delete(&txn, &ctx.org_id, consent_id).await?;

        txn.commit().await.map_err(DatabaseError::from)?;

        debug!(org_id = %ctx.org_id, consent_id = %consent_id, "consent hard-deleted");
        Ok(())
    }

    /// Filtered page of consents; each returned row goes through expiry
    /// materialization like any other read.
    pub async fn search(
        &self,
        ctx: &OrgContext,
        mut filter: ConsentSearchFilter,
        user_ids: Vec<String>,
    ) -> ConsentResult<ConsentSearchResponse> {
        let limit = filter.effective_limit() as i64;
        let offset = filter.effective_offset() as i64;

        if !user_ids.is_empty() {
            let mut ids: HashSet<String> = HashSet::new();
            for user_id in &user_ids {
                for auth in self
                    .auth_resources
                    .get_by_user_id(&*self.db, &ctx.org_id, user_id)
                    .await?
                {
                    ids.insert(auth.consent_id);
                }
            }
            if ids.is_empty() {
                return Ok(ConsentSearchResponse {
                    data: vec![],
                    total: 0,
                    limit,
                    offset,
                });
            }
            filter.consent_ids = ids.into_iter().collect();
        }

        let (rows, total) = self.consents.search(&*self.db, &ctx.org_id, &filter).await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            match self.materialize_expiry(row).await {
                Ok(row) => data.push(self.load_response(&row).await?),
                // deleted concurrently between page read and materialization
                Err(ConsentError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(ConsentSearchResponse {
            data,
            total,
            limit,
            offset,
        })
    }

    /// Audit trail of one consent, newest first.
    pub async fn get_status_audit(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
    ) -> ConsentResult<Vec<StatusAuditResponse>> {
        if !self
            .consents
            .exists(&*self.db, &ctx.org_id, consent_id)
            .await?
        {
            return Err(ConsentError::not_found("Consent", consent_id));
        }

        let rows = self
            .audits
            .get_by_consent_id(&*self.db, &ctx.org_id, consent_id)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| StatusAuditResponse {
                id: row.status_audit_id,
                consent_id: row.consent_id,
                previous_status: row.previous_status,
                current_status: row.current_status,
                action_time: row.action_time,
                reason: row.reason,
                action_by: row.action_by,
            })
            .collect())
    }

    /// Store the pass-through file blob for an existing consent.
    pub async fn store_file(
        &self,
        ctx: &OrgContext,
        consent_id: &str,
        content: String,
    ) -> ConsentResult<()> {
        if !self
            .consents
            .exists(&*self.db, &ctx.org_id, consent_id)
            .await?
        {
            return Err(ConsentError::not_found("Consent", consent_id));
        }

        self.files
            .store(&*self.db, &ctx.org_id, consent_id, &content)
            .await?;
        Ok(())
    }

    pub async fn get_file(&self, ctx: &OrgContext, consent_id: &str) -> ConsentResult<String> {
        self.files
            .get(&*self.db, &ctx.org_id, consent_id)
            .await?
            .map(|f| f.file_content)
            .ok_or_else(|| ConsentError::not_found("ConsentFile", consent_id))
    }

    /// Lazy expiry rule, the single source of the `EXPIRED` status.
    ///
    /// Only an `ACTIVE` consent whose validity window has elapsed is
    /// promoted; the row is re-checked under lock so concurrent readers
    /// produce exactly one audit entry.
    pub(crate) async fn materialize_expiry(
        &self,
        consent: consent::Model,
    ) -> ConsentResult<consent::Model> {
        if !consent.is_expiry_due(now_seconds()) {
            return Ok(consent);
        }

        let txn = self.db.begin().await.map_err(DatabaseError::from)?;

        let current = match self
            .consents
            .get_for_update(&txn, &consent.org_id, &consent.consent_id)
            .await?
        {
            Some(row) => row,
            None => {
                txn.rollback().await.map_err(DatabaseError::from)?;
                return Err(ConsentError::not_found(
                    "Consent",
                    consent.consent_id.as_str(),
                ));
            }
        };

        if !current.is_expiry_due(now_seconds()) {
            // someone else already materialized, or the status moved on
            txn.rollback().await.map_err(DatabaseError::from)?;
            return Ok(current);
        }

        let now = now_millis();
        let previous = current.current_status.clone();
        let expired = ConsentStatus::Expired.as_str();

        self.consents
            .update_status(&txn, &current.org_id, &current.consent_id, expired, now)
            .await?;

        let auths = self
            .auth_resources
            .get_by_consent_id(&txn, &current.org_id, &current.consent_id)
            .await?;
        for auth in auths.iter().filter(|a| a.state() == AuthState::Approved) {
            self.auth_resources
                .update_status(
                    &txn,
                    &current.org_id,
                    &auth.auth_id,
                    AuthState::SYS_EXPIRED,
                    now,
                )
                .await?;
        }

        let audit = audit_row(
            &current.org_id,
            &current.consent_id,
            &previous,
            expired,
            "validity_time elapsed",
            None,
            now,
        );
        self.audits.create(&txn, &audit).await?;

        txn.commit().await.map_err(DatabaseError::from)?;

        events::consent_status_changed(
            &current.org_id,
            &current.consent_id,
            &previous,
            expired,
            "validity_time elapsed",
        );

        let mut updated = current;
        updated.current_status = expired.to_string();
        updated.updated_time = now;
        Ok(updated)
    }

    /// Assemble the enriched response for a stored consent.
    pub(crate) async fn load_response(
        &self,
        consent: &consent::Model,
    ) -> ConsentResult<ConsentResponse> {
        let mappings = self
            .mappings
            .get_by_consent(&*self.db, &consent.org_id, &consent.consent_id)
            .await?;
        let attributes = self
            .attributes
            .get_all(&*self.db, &consent.org_id, &consent.consent_id)
            .await?;
        let auths = self
            .auth_resources
            .get_by_consent_id(&*self.db, &consent.org_id, &consent.consent_id)
            .await?;

        let mut purposes = Vec::with_capacity(mappings.len());
        for mapping in &mappings {
            let definition = self
                .catalog
                .get_purpose_by_name(&consent.org_id, &mapping.purpose_name)
                .await?;
            purposes.push(purpose_response_from_mapping(mapping, definition.as_ref()));
        }

        Ok(response_from_parts(
            consent,
            purposes,
            attributes,
            auths.iter().map(auth_response).collect(),
        ))
    }

    async fn resolve_purposes(
        &self,
        org_id: &str,
        items: &[PurposeItem],
    ) -> ConsentResult<Vec<(PurposeItem, PurposeDefinition)>> {
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            match self.catalog.get_purpose_by_name(org_id, &item.name).await? {
                Some(definition) => resolved.push((item.clone(), definition)),
                None => {
                    return Err(ConsentError::not_found("Purpose", item.name.as_str()));
                }
            }
        }
        Ok(resolved)
    }
}

fn response_from_parts(
    consent: &consent::Model,
    purposes: Vec<PurposeResponse>,
    attributes: BTreeMap<String, String>,
    authorizations: Vec<consent_core::model::AuthorizationResponse>,
) -> ConsentResponse {
    ConsentResponse {
        id: consent.consent_id.clone(),
        consent_type: consent.consent_type.clone(),
        status: consent.current_status.clone(),
        client_id: consent.client_id.clone(),
        created_time: consent.created_time,
        updated_time: consent.updated_time,
        validity_time: consent.validity_time,
        frequency: consent.consent_frequency,
        recurring_indicator: consent.recurring_indicator,
        data_access_validity_duration: consent.data_access_validity_duration,
        receipt: consent
            .receipt
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok()),
        consent_purpose: purposes,
        attributes,
        authorizations,
    }
}

fn purpose_response(item: &PurposeItem, definition: Option<&PurposeDefinition>) -> PurposeResponse {
    PurposeResponse {
        name: item.name.clone(),
        value: item.value.clone().unwrap_or_default(),
        is_user_approved: item.is_user_approved,
        is_mandatory: item.is_mandatory,
        purpose_type: definition
            .map(|d| d.purpose_type.clone())
            .unwrap_or_default(),
        description: definition.map(|d| d.description.clone()).unwrap_or_default(),
        attributes: definition
            .map(|d| d.attributes.clone())
            .unwrap_or_else(|| serde_json::json!({})),
    }
}

fn purpose_response_from_mapping(
    mapping: &mapping_entity::Model,
    definition: Option<&PurposeDefinition>,
) -> PurposeResponse {
    PurposeResponse {
        name: mapping.purpose_name.clone(),
        value: mapping.purpose_value.clone().unwrap_or_default(),
        is_user_approved: mapping.is_user_approved,
        is_mandatory: mapping.is_mandatory,
        purpose_type: definition
            .map(|d| d.purpose_type.clone())
            .unwrap_or_default(),
        description: definition.map(|d| d.description.clone()).unwrap_or_default(),
        attributes: definition
            .map(|d| d.attributes.clone())
            .unwrap_or_else(|| serde_json::json!({})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_response_enrichment_defaults_on_catalog_miss() {
        let mapping = mapping_entity::Model {
            mapping_id: "m1".to_string(),
            consent_id: "c1".to_string(),
            org_id: "org1".to_string(),
            purpose_id: "p1".to_string(),
            purpose_name: "data_access".to_string(),
            purpose_value: Some("accounts".to_string()),
            is_user_approved: true,
            is_mandatory: false,
        };

        let response = purpose_response_from_mapping(&mapping, None);
        assert_eq!(response.name, "data_access");
        assert_eq!(response.value, "accounts");
        assert_eq!(response.purpose_type, "");
        assert_eq!(response.description, "");
        assert_eq!(response.attributes, serde_json::json!({}));
    }

    #[test]
    fn test_response_from_parts_parses_receipt() {
        let consent = consent::Model {
            consent_id: "c1".to_string(),
            org_id: "org1".to_string(),
            client_id: "app".to_string(),
            consent_type: "accounts".to_string(),
            current_status: "ACTIVE".to_string(),
            consent_frequency: Some(3),
            validity_time: None,
            recurring_indicator: None,
            data_access_validity_duration: None,
            receipt: Some(r#"{"hash":"abc"}"#.to_string()),
            created_time: 1,
            updated_time: 2,
        };

        let response = response_from_parts(&consent, vec![], BTreeMap::new(), vec![]);
        assert_eq!(response.frequency, Some(3));
        assert_eq!(response.receipt, Some(serde_json::json!({"hash": "abc"})));
    }
}
