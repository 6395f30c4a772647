//! Consent validation service
//!
//! A read-only authorization oracle. Every outcome, including failures, is
//! reported through the structured envelope with HTTP 200; the embedded
//! snapshot always reflects the post-expiry-materialization state.

use crate::headers::OrgContext;
use crate::services::ConsentService;
use consent_core::errors::{ConsentError, ConsentResult};
use consent_core::model::{outcome, ValidateConsentRequest, ValidateConsentResponse};
use consent_core::ConsentStatus;
use consent_db::repositories::ConsentRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::warn;

pub struct ValidationService {
    db: Arc<DatabaseConnection>,
    consents: ConsentRepository,
    consent_service: Arc<ConsentService>,
}

impl ValidationService {
    pub fn new(db: Arc<DatabaseConnection>, consent_service: Arc<ConsentService>) -> Self {
        Self {
            db,
            consents: ConsentRepository,
            consent_service,
        }
    }

    /// Decide whether the consent is currently usable. Never fails from the
    /// caller's perspective; errors fold into the outcome envelope.
    pub async fn validate(
        &self,
        ctx: &OrgContext,
        request: &ValidateConsentRequest,
    ) -> ValidateConsentResponse {
        if request.consent_id.trim().is_empty() {
            return ValidateConsentResponse::failure(
                400,
                outcome::INVALID_REQUEST,
                "consentId is required",
                None,
            );
        }
        if request.user_id.trim().is_empty() {
            return ValidateConsentResponse::failure(
                400,
                outcome::INVALID_REQUEST,
                "userId is required",
                None,
            );
        }

        match self.evaluate(ctx, request).await {
            Ok(response) => response,
            Err(ConsentError::NotFound { .. }) => ValidateConsentResponse::failure(
                404,
                outcome::CONSENT_NOT_FOUND,
                format!("consent {} does not exist", request.consent_id),
                None,
            ),
            Err(ConsentError::Database(cause)) => {
                warn!(cause = %cause, "validation oracle hit a persistence failure");
                ValidateConsentResponse::failure(
                    500,
                    outcome::INTERNAL_ERROR,
                    "consent validation could not be completed",
                    None,
                )
            }
            Err(e) => ValidateConsentResponse::failure(
                400,
                outcome::INVALID_REQUEST,
                e.to_string(),
                None,
            ),
        }
    }

    async fn evaluate(
        &self,
        ctx: &OrgContext,
        request: &ValidateConsentRequest,
    ) -> ConsentResult<ValidateConsentResponse> {
        let consent = self
            .consents
            .get_by_id(&*self.db, &ctx.org_id, &request.consent_id)
            .await?
            .ok_or_else(|| ConsentError::not_found("Consent", request.consent_id.as_str()))?;

        let status_before = consent.status();
        let consent = self.consent_service.materialize_expiry(consent).await?;
        let status_after = consent.status();

        let snapshot = self.consent_service.load_response(&consent).await?;

        // expiry fired during this call
        if status_before == Some(ConsentStatus::Active)
            && status_after == Some(ConsentStatus::Expired)
        {
            return Ok(ValidateConsentResponse::failure(
                401,
                outcome::CONSENT_EXPIRED,
                "consent validity period has elapsed",
                Some(snapshot),
            ));
        }

        if status_after != Some(ConsentStatus::Active) {
            return Ok(ValidateConsentResponse::failure(
                401,
                outcome::INVALID_CONSENT_STATUS,
                format!(
                    "consent is in status {} and cannot be used",
                    consent.current_status
                ),
                Some(snapshot),
            ));
        }

        Ok(ValidateConsentResponse::valid(snapshot))
    }
}
