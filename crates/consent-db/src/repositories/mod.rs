//! Repository layer for database operations
//!
//! Every method takes its connection generically (`C: ConnectionTrait`), so
//! the caller decides whether it runs against the pool or inside an open
//! transaction; the layer never opens transactions itself. Write methods
//! return "executed" or a storage error with no row-count signal; callers
//! pre-check existence via a read where that matters.

pub mod auth_resource;
pub mod consent;
pub mod consent_attribute;
pub mod consent_file;
pub mod purpose;
pub mod purpose_mapping;
pub mod status_audit;

pub use auth_resource::AuthResourceRepository;
pub use consent::{ConsentRepository, ConsentSearchFilter};
pub use consent_attribute::ConsentAttributeRepository;
pub use consent_file::ConsentFileRepository;
pub use purpose::PurposeRepository;
pub use purpose_mapping::PurposeMappingRepository;
pub use status_audit::StatusAuditRepository;
