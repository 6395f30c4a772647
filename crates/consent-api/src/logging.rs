use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::{ApiConfig, LogFormat};

/// Initialize the logging system based on configuration
pub fn init_logging(config: &ApiConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = Registry::default().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

            subscriber.with(json_layer).init();
        }
        LogFormat::Pretty => {
            let pretty_layer = fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

            subscriber.with(pretty_layer).init();
        }
        LogFormat::Compact => {
            let compact_layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_span_events(FmtSpan::CLOSE);

            subscriber.with(compact_layer).init();
        }
    }

    tracing::info!(
        log_level = %config.logging.level,
        log_format = ?config.logging.format,
        "Logging initialized"
    );

    Ok(())
}

/// Structured logging for application lifecycle events
pub mod events {
    /// Log application startup
    pub fn app_starting(name: &str, version: &str) {
        tracing::info!(
            app_name = %name,
            version = %version,
            event = "app_starting",
            "Application starting"
        );
    }

    /// Log application ready
    pub fn app_ready(name: &str, bind_address: &str) {
        tracing::info!(
            app_name = %name,
            bind_address = %bind_address,
            event = "app_ready",
            "Application ready to accept requests"
        );
    }

    /// Log application shutdown
    pub fn app_stopping(name: &str, reason: Option<&str>) {
        tracing::info!(
            app_name = %name,
            reason = reason.unwrap_or("normal"),
            event = "app_stopping",
            "Application shutting down"
        );
    }

    /// Log database connection established; the url display form masks
    /// credentials already
    pub fn database_connected(database_url: &consent_db::DatabaseUrl) {
        tracing::info!(
            database_url = %database_url,
            event = "database_connected",
            "Database connection established"
        );
    }

    /// Log a committed consent status transition
    pub fn consent_status_changed(
        org_id: &str,
        consent_id: &str,
        previous: &str,
        current: &str,
        reason: &str,
    ) {
        tracing::info!(
            org_id = %org_id,
            consent_id = %consent_id,
            previous_status = %previous,
            current_status = %current,
            reason = %reason,
            event = "consent_status_changed",
            "Consent status changed"
        );
    }
}
