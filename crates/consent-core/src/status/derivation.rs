//! Consent status derivation
//!
//! Maps a bag of authorization sub-states onto a single consent status under
//! a fixed precedence. The function is total, deterministic, and free of side
//! effects; callers apply terminal-status stickiness on top of it.

use super::{AuthState, ConsentStatus};

/// Extension hook for resolving custom authorization sub-states.
///
/// Deployments can map their own sub-state vocabulary onto consent statuses.
/// Returning `None` passes through, which preserves the consent's current
/// status during derivation.
pub trait CustomStateResolver: Send + Sync {
    fn resolve(&self, custom_state: &str) -> Option<ConsentStatus>;
}

/// Default resolver: never maps a custom state.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughResolver;

impl CustomStateResolver for PassthroughResolver {
    fn resolve(&self, _custom_state: &str) -> Option<ConsentStatus> {
        None
    }
}

/// Derive the consent status from authorization sub-states.
///
/// Precedence, first hit wins:
/// `REJECTED > REVOKED > EXPIRED > CREATED > custom-preserve > ACTIVE`.
/// An empty bag yields `CREATED`. A bag whose only non-approved members are
/// custom states preserves `current` (defaulting to `ACTIVE` on initial
/// create, where there is no current status yet).
pub fn derive_consent_status(
    states: &[AuthState],
    current: Option<ConsentStatus>,
) -> ConsentStatus {
    derive_with_resolver(states, current, &PassthroughResolver)
}

/// Derivation variant consulting an extension hook for custom states.
pub fn derive_with_resolver(
    states: &[AuthState],
    current: Option<ConsentStatus>,
    resolver: &dyn CustomStateResolver,
) -> ConsentStatus {
    if states.is_empty() {
        return ConsentStatus::Created;
    }

    if states.iter().any(|s| matches!(s, AuthState::Rejected)) {
        return ConsentStatus::Rejected;
    }

    if states
        .iter()
        .any(|s| matches!(s, AuthState::Revoked | AuthState::SysRevoked))
    {
        return ConsentStatus::Revoked;
    }

    if states.iter().any(|s| matches!(s, AuthState::SysExpired)) {
        return ConsentStatus::Expired;
    }

    if states.iter().any(|s| matches!(s, AuthState::Created)) {
        return ConsentStatus::Created;
    }

    let customs: Vec<&str> = states
        .iter()
        .filter_map(|s| match s {
            AuthState::Custom(c) => Some(c.as_str()),
            _ => None,
        })
        .collect();

    if !customs.is_empty() {
        for custom in customs {
            if let Some(mapped) = resolver.resolve(custom) {
                return mapped;
            }
        }
        // Unknown states never demote or promote the consent.
        return current.unwrap_or(ConsentStatus::Active);
    }

    ConsentStatus::Active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(raw: &[&str]) -> Vec<AuthState> {
        raw.iter().map(|s| AuthState::parse(s)).collect()
    }

    #[test]
    fn test_empty_bag_is_created() {
        assert_eq!(derive_consent_status(&[], None), ConsentStatus::Created);
        assert_eq!(
            derive_consent_status(&[], Some(ConsentStatus::Active)),
            ConsentStatus::Created
        );
    }

    #[test]
    fn test_all_approved_is_active() {
        assert_eq!(
            derive_consent_status(&states(&["approved"]), None),
            ConsentStatus::Active
        );
        assert_eq!(
            derive_consent_status(&states(&["approved", "approved", "approved"]), None),
            ConsentStatus::Active
        );
    }

    #[test]
    fn test_rejected_takes_precedence_over_everything() {
        for rest in [
            vec!["approved"],
            vec!["revoked"],
            vec!["sys_revoked"],
            vec!["sys_expired"],
            vec!["created"],
            vec!["some_custom"],
        ] {
            let mut bag = rest.clone();
            bag.push("rejected");
            assert_eq!(
                derive_consent_status(&states(&bag), None),
                ConsentStatus::Rejected,
                "bag: {:?}",
                bag
            );
        }
    }

    #[test]
    fn test_revoked_beats_expired_created_and_active() {
        assert_eq!(
            derive_consent_status(&states(&["approved", "revoked"]), None),
            ConsentStatus::Revoked
        );
        assert_eq!(
            derive_consent_status(&states(&["sys_revoked", "sys_expired", "created"]), None),
            ConsentStatus::Revoked
        );
    }

    #[test]
    fn test_sys_expired_beats_created_and_active() {
        assert_eq!(
            derive_consent_status(&states(&["approved", "sys_expired", "created"]), None),
            ConsentStatus::Expired
        );
    }

    #[test]
    fn test_created_beats_active() {
        assert_eq!(
            derive_consent_status(&states(&["approved", "created"]), None),
            ConsentStatus::Created
        );
    }

    #[test]
    fn test_custom_preserves_current_status() {
        assert_eq!(
            derive_consent_status(&states(&["approved", "step_up"]), Some(ConsentStatus::Created)),
            ConsentStatus::Created
        );
        assert_eq!(
            derive_consent_status(&states(&["step_up"]), Some(ConsentStatus::Rejected)),
            ConsentStatus::Rejected
        );
    }

    #[test]
    fn test_custom_without_current_defaults_to_active() {
        assert_eq!(
            derive_consent_status(&states(&["step_up"]), None),
            ConsentStatus::Active
        );
    }

    #[test]
    fn test_resolver_hook_maps_custom_state() {
        struct MapAll(ConsentStatus);
        impl CustomStateResolver for MapAll {
            fn resolve(&self, _c: &str) -> Option<ConsentStatus> {
                Some(self.0)
            }
        }

        assert_eq!(
            derive_with_resolver(
                &states(&["approved", "biometric_pending"]),
                Some(ConsentStatus::Active),
                &MapAll(ConsentStatus::Created),
            ),
            ConsentStatus::Created
        );
    }

    #[test]
    fn test_resolver_hook_does_not_override_canonical_states() {
        struct MapAll;
        impl CustomStateResolver for MapAll {
            fn resolve(&self, _c: &str) -> Option<ConsentStatus> {
                Some(ConsentStatus::Active)
            }
        }

        // rejected still wins even with an aggressive resolver present
        assert_eq!(
            derive_with_resolver(&states(&["rejected", "custom"]), None, &MapAll),
            ConsentStatus::Rejected
        );
    }

    #[test]
    fn test_derivation_is_total_over_arbitrary_strings() {
        let weird = states(&["", "APPROVED", "Approved ", "123", "rejected\n", "🙂"]);
        // none of these are canonical tokens, so the whole bag is custom
        assert!(weird.iter().all(|s| s.is_custom()));
        let derived = derive_consent_status(&weird, Some(ConsentStatus::Expired));
        assert_eq!(derived, ConsentStatus::Expired);
    }
}
