//! Database connection management

use crate::config::{DatabaseConfig, SqlLoggingLevel};
use crate::error::Result;
use log::LevelFilter;
use sea_orm::{ConnectOptions, Database, DatabaseConnection as SeaOrmConnection};
use std::time::Duration;

/// Type alias for database connection
pub type DatabaseConnection = SeaOrmConnection;

/// Establish a database connection pool with the given configuration
pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut connect_options = ConnectOptions::new(config.database_url().as_str());

    connect_options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout));

    match config.sql_logging {
        SqlLoggingLevel::Off => {
            connect_options.sqlx_logging(false);
        }
        SqlLoggingLevel::Error => {
            connect_options
                .sqlx_logging(true)
                .sqlx_logging_level(LevelFilter::Error);
        }
        SqlLoggingLevel::Warn => {
            connect_options
                .sqlx_logging(true)
                .sqlx_logging_level(LevelFilter::Warn);
        }
        SqlLoggingLevel::Info => {
            connect_options
                .sqlx_logging(true)
                .sqlx_logging_level(LevelFilter::Info);
        }
        SqlLoggingLevel::Debug => {
            connect_options
                .sqlx_logging(true)
                .sqlx_logging_level(LevelFilter::Debug);
        }
        SqlLoggingLevel::Trace => {
            connect_options
                .sqlx_logging(true)
                .sqlx_logging_level(LevelFilter::Trace);
        }
    }

    tracing::info!(
        "Establishing database connection to {}",
        config.database_url()
    );

    let connection = Database::connect(connect_options).await?;

    tracing::info!("Database connection established successfully");
    Ok(connection)
}

/// Test database connection
pub async fn test_connection(connection: &DatabaseConnection) -> Result<()> {
    connection.ping().await?;
    Ok(())
}

/// Close database connection gracefully
pub async fn close_connection(connection: DatabaseConnection) -> Result<()> {
    connection.close().await?;
    tracing::info!("Database connection closed");
    Ok(())
}

/// Connection health information
#[derive(Debug, Clone)]
pub struct ConnectionHealth {
    pub is_connected: bool,
    pub response_time_ms: Option<u64>,
    pub error_message: Option<String>,
}

/// Check connection health with a timed ping
pub async fn check_connection_health(connection: &DatabaseConnection) -> ConnectionHealth {
    let start = std::time::Instant::now();

    match connection.ping().await {
        Ok(_) => ConnectionHealth {
            is_connected: true,
            response_time_ms: Some(start.elapsed().as_millis() as u64),
            error_message: None,
        },
        Err(e) => ConnectionHealth {
            is_connected: false,
            response_time_ms: None,
            error_message: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseUrl;

    #[test]
    fn test_connection_options_configuration() {
        let database_url = DatabaseUrl::new("sqlite::memory:".to_string()).unwrap();
        let config = DatabaseConfig::new(database_url);

        let mut connect_options = ConnectOptions::new(config.database_url().as_str());
        connect_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections);

        assert_eq!(config.max_connections, 20);
    }

    #[test]
    fn test_connection_health_structure() {
        let health = ConnectionHealth {
            is_connected: true,
            response_time_ms: Some(12),
            error_message: None,
        };

        assert!(health.is_connected);
        assert_eq!(health.response_time_ms, Some(12));
        assert!(health.error_message.is_none());
    }
}
