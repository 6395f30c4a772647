//! Consent and authorization status sets
//!
//! The consent status is never set directly by callers; it is derived from
//! the bag of authorization sub-states (see [`derivation`]).

pub mod derivation;

pub use derivation::{
    derive_consent_status, derive_with_resolver, CustomStateResolver, PassthroughResolver,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Consent lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsentStatus {
    #[serde(rename = "CREATED")]
    Created,
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "REJECTED")]
    Rejected,
    #[serde(rename = "REVOKED")]
    Revoked,
    #[serde(rename = "EXPIRED")]
    Expired,
}

impl ConsentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Active => "ACTIVE",
            Self::Rejected => "REJECTED",
            Self::Revoked => "REVOKED",
            Self::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(Self::Created),
            "ACTIVE" => Some(Self::Active),
            "REJECTED" => Some(Self::Rejected),
            "REVOKED" => Some(Self::Revoked),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Terminal statuses are sticky: once entered they are never left.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked | Self::Expired)
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization sub-state stored on an individual authorization row.
///
/// Any string outside the canonical set is carried as [`AuthState::Custom`];
/// parsing never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthState {
    Approved,
    Rejected,
    Created,
    Revoked,
    SysRevoked,
    SysExpired,
    Custom(String),
}

impl AuthState {
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";
    pub const CREATED: &'static str = "created";
    pub const REVOKED: &'static str = "revoked";
    pub const SYS_REVOKED: &'static str = "sys_revoked";
    pub const SYS_EXPIRED: &'static str = "sys_expired";

    pub fn parse(s: &str) -> Self {
        match s {
            Self::APPROVED => Self::Approved,
            Self::REJECTED => Self::Rejected,
            Self::CREATED => Self::Created,
            Self::REVOKED => Self::Revoked,
            Self::SYS_REVOKED => Self::SysRevoked,
            Self::SYS_EXPIRED => Self::SysExpired,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => Self::APPROVED,
            Self::Rejected => Self::REJECTED,
            Self::Created => Self::CREATED,
            Self::Revoked => Self::REVOKED,
            Self::SysRevoked => Self::SYS_REVOKED,
            Self::SysExpired => Self::SYS_EXPIRED,
            Self::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
