//! # Consent DB
//!
//! Persistence layer for the consent management service: SeaORM entity
//! models, transaction-parameterised repositories, schema migrations, and
//! connection management over PostgreSQL (sqlite for tests).

pub mod config;
pub mod connection;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

// Re-export commonly used types
pub use config::{DatabaseConfig, DatabaseUrl, SqlLoggingLevel};
pub use connection::{
    check_connection_health, close_connection, establish_connection, test_connection,
    ConnectionHealth, DatabaseConnection,
};
pub use error::{DatabaseError, DatabaseResultExt, Result};
pub use migration::{run_migrations, Migrator};
pub use repositories::{
    AuthResourceRepository, ConsentAttributeRepository, ConsentFileRepository, ConsentRepository,
    ConsentSearchFilter, PurposeMappingRepository, PurposeRepository, StatusAuditRepository,
};

// Re-export SeaORM types for convenience
pub use sea_orm::{
    ConnectionTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, Statement, TransactionTrait, Unchanged,
};
pub use sea_orm_migration::MigratorTrait;
