//! Database error types and utilities

use thiserror::Error;

/// Database operation result type
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Database-specific error types
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for DatabaseError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::ConnectionAcquire(source) => {
                DatabaseError::Connection(source.to_string())
            }
            sea_orm::DbErr::Conn(conn_err) => DatabaseError::Connection(conn_err.to_string()),
            sea_orm::DbErr::RecordNotFound(msg) => DatabaseError::NotFound(msg),
            sea_orm::DbErr::Query(query_err) => DatabaseError::Query(query_err.to_string()),
            sea_orm::DbErr::Exec(exec_err) => DatabaseError::Query(exec_err.to_string()),
            sea_orm::DbErr::Migration(msg) => DatabaseError::Migration(msg),
            _ => DatabaseError::Internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

/// Persistence failures surface to the service layer as the generic
/// database variant; the full cause stays in the logs.
impl From<DatabaseError> for consent_core::ConsentError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!(error = %err, "persistence layer failure");
        consent_core::ConsentError::Database(err.to_string())
    }
}

/// Extension trait for converting database results
pub trait DatabaseResultExt<T> {
    /// Convert a not-found error to None
    fn optional(self) -> Result<Option<T>>;
}

impl<T> DatabaseResultExt<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(DatabaseError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_err_conversion() {
        let err: DatabaseError = sea_orm::DbErr::RecordNotFound("consent".to_string()).into();
        match err {
            DatabaseError::NotFound(msg) => assert_eq!(msg, "consent"),
            _ => panic!("Expected NotFound"),
        }
    }

    #[test]
    fn test_core_error_conversion_is_generic() {
        let err = DatabaseError::Query("syntax error near SELECT".to_string());
        let core: consent_core::ConsentError = err.into();
        assert!(matches!(core, consent_core::ConsentError::Database(_)));
    }

    #[test]
    fn test_result_extension_optional() {
        let not_found: Result<String> = Err(DatabaseError::NotFound("row".to_string()));
        assert!(not_found.optional().unwrap().is_none());

        let other: Result<String> = Err(DatabaseError::Query("boom".to_string()));
        assert!(other.optional().is_err());
    }
}
