use crate::config::ApiConfig;
use crate::services::{
    AuthResourceService, ConsentService, DbPurposeCatalog, ParentConsentStore, PurposeCatalog,
    ValidationService,
};
use consent_core::{CustomStateResolver, PassthroughResolver};
use consent_db::repositories::ConsentRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Application configuration
    pub config: Arc<ApiConfig>,
    /// Health check state
    pub health: Arc<RwLock<HealthState>>,
    /// Consent aggregate service
    pub consents: Arc<ConsentService>,
    /// Authorization resource service
    pub auth_resources: Arc<AuthResourceService>,
    /// Validation oracle
    pub validation: Arc<ValidationService>,
}

/// Health state tracking
#[derive(Debug, Clone)]
pub struct HealthState {
    pub database_healthy: bool,
    pub last_check: chrono::DateTime<chrono::Utc>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            database_healthy: false,
            last_check: chrono::Utc::now(),
            startup_time: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl AppState {
    /// Connect to the database (running migrations when configured) and wire
    /// up the service graph.
    pub async fn new(config: ApiConfig) -> Result<Self, AppStateError> {
        let db_config = config
            .database_config()
            .map_err(|e| AppStateError::Configuration(e.to_string()))?;

        let connection = consent_db::establish_connection(&db_config).await?;

        if db_config.auto_migrate {
            consent_db::run_migrations(&connection).await?;
        }

        crate::logging::events::database_connected(db_config.database_url());

        Ok(Self::with_connection(config, Arc::new(connection)))
    }

    /// Build the state on top of an existing connection (used by tests).
    pub fn with_connection(config: ApiConfig, db: Arc<DatabaseConnection>) -> Self {
        let resolver: Arc<dyn CustomStateResolver> = Arc::new(PassthroughResolver);
        let catalog: Arc<dyn PurposeCatalog> = Arc::new(DbPurposeCatalog::new(db.clone()));
        let parent: Arc<dyn ParentConsentStore> = Arc::new(ConsentRepository);

        let consents = Arc::new(ConsentService::new(
            db.clone(),
            catalog,
            resolver.clone(),
        ));
        let auth_resources = Arc::new(AuthResourceService::new(db.clone(), parent, resolver));
        let validation = Arc::new(ValidationService::new(db.clone(), consents.clone()));

        Self {
            db,
            config: Arc::new(config),
            health: Arc::new(RwLock::new(HealthState {
                database_healthy: true,
                ..Default::default()
            })),
            consents,
            auth_resources,
            validation,
        }
    }

    /// Check the health of all system components
    pub async fn health_check(&self) -> HealthCheckResult {
        let connection_health = consent_db::check_connection_health(&self.db).await;

        let mut health = self.health.write().await;
        health.database_healthy = connection_health.is_connected;
        health.last_check = chrono::Utc::now();
        let current = health.clone();
        drop(health);

        HealthCheckResult {
            healthy: connection_health.is_connected,
            checks: vec![HealthCheck {
                name: "database".to_string(),
                status: if connection_health.is_connected {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unhealthy
                },
                message: connection_health
                    .error_message
                    .unwrap_or_else(|| "Database connection is healthy".to_string()),
                last_checked: current.last_check,
            }],
            uptime: chrono::Utc::now()
                .signed_duration_since(current.startup_time)
                .num_seconds(),
            version: current.version,
        }
    }

    pub fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Failed to establish database connection: {0}")]
    DatabaseConnection(#[from] consent_db::DatabaseError),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub checks: Vec<HealthCheck>,
    pub uptime: i64,
    pub version: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    pub last_checked: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "healthy")]
    Healthy,
    #[serde(rename = "unhealthy")]
    Unhealthy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_state_defaults() {
        let health_state = HealthState::default();
        assert_eq!(health_state.version, env!("CARGO_PKG_VERSION"));
        assert!(!health_state.database_healthy);
    }

    #[test]
    fn test_app_state_error_display() {
        let error = AppStateError::Configuration("missing database url".to_string());
        assert!(error
            .to_string()
            .contains("Configuration error: missing database url"));
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::Healthy;
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"healthy\"");

        let status = HealthStatus::Unhealthy;
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"unhealthy\"");
    }
}
