use actix_web::{middleware::DefaultHeaders, web, App, HttpServer};
use tracing::{error, info};

mod config;
mod handlers;
mod headers;
mod logging;
mod middleware;
mod routes;
mod services;
mod state;

use config::ApiConfig;
use middleware::{ErrorHandler, RequestId};
use state::AppState;

pub const SERVICE_NAME: &str = "Consent Management API";
pub const API_VERSION: &str = "v1";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize configuration
    let config = match ApiConfig::from_env() {
        Ok(config) => {
            if let Err(e) = config.validate() {
                eprintln!("Configuration validation failed: {}", e);
                std::process::exit(1);
            }
            config
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    logging::events::app_starting(SERVICE_NAME, env!("CARGO_PKG_VERSION"));

    // Initialize application state (connects the pool, runs migrations)
    let app_state = match AppState::new(config.clone()).await {
        Ok(state) => {
            info!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    // Configure the HTTP server
    let worker_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            // Add application state
            .app_data(web::Data::new(app_state.clone()))
            // Request ID middleware first so later layers can read the id
            .wrap(RequestId)
            // Error logging middleware
            .wrap(ErrorHandler)
            // CORS middleware
            .wrap(middleware::setup_cors(&worker_config.cors))
            // Security headers
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            // Configure routes
            .configure(routes::configure_routes)
    });

    let server = if let Some(workers) = config.server.workers {
        info!("Setting worker threads to: {}", workers);
        server.workers(workers)
    } else {
        server
    };

    let server = server.bind(&config.server_address())?;
    let server = server.run();
    let server_handle = server.handle();

    let server_task = tokio::spawn(server);

    logging::events::app_ready(SERVICE_NAME, &config.server_address());

    // Wait for shutdown signal
    shutdown_signal().await;

    logging::events::app_stopping(SERVICE_NAME, None);

    // Gracefully shutdown the server
    server_handle.stop(true).await;

    match server_task.await {
        Ok(Ok(())) => info!("Server shut down successfully"),
        Ok(Err(e)) => error!("Server error during shutdown: {}", e),
        Err(e) => error!("Failed to shut down server task: {}", e),
    }

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_identity() {
        assert_eq!(env!("CARGO_PKG_NAME"), "consent-api");
    }

    #[tokio::test]
    async fn test_graceful_shutdown_select() {
        tokio::select! {
            _ = tokio::time::sleep(tokio::time::Duration::from_millis(1)) => {},
            _ = shutdown_signal() => {},
        }
    }
}
