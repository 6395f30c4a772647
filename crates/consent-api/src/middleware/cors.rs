use actix_cors::Cors;
use actix_web::http::{header, Method};

/// Setup CORS middleware based on configuration
pub fn setup_cors(config: &crate::config::CorsConfig) -> Cors {
    let mut cors = Cors::default();

    for origin in &config.allowed_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    let mut methods = Vec::new();
    for method_str in &config.allowed_methods {
        match method_str.to_uppercase().as_str() {
            "GET" => methods.push(Method::GET),
            "POST" => methods.push(Method::POST),
            "PUT" => methods.push(Method::PUT),
            "DELETE" => methods.push(Method::DELETE),
            "PATCH" => methods.push(Method::PATCH),
            "OPTIONS" => methods.push(Method::OPTIONS),
            "HEAD" => methods.push(Method::HEAD),
            _ => tracing::warn!("Unknown HTTP method in CORS config: {}", method_str),
        }
    }
    cors = cors.allowed_methods(methods);

    let mut headers = Vec::new();
    for header_str in &config.allowed_headers {
        if let Ok(header_name) = header::HeaderName::try_from(header_str.as_str()) {
            headers.push(header_name);
        } else {
            tracing::warn!("Invalid header name in CORS config: {}", header_str);
        }
    }
    cors = cors.allowed_headers(headers);

    let mut expose_headers = Vec::new();
    for header_str in &config.expose_headers {
        if let Ok(header_name) = header::HeaderName::try_from(header_str.as_str()) {
            expose_headers.push(header_name);
        } else {
            tracing::warn!("Invalid expose header name in CORS config: {}", header_str);
        }
    }
    if !expose_headers.is_empty() {
        cors = cors.expose_headers(expose_headers);
    }

    if let Some(max_age) = config.max_age {
        cors = cors.max_age(max_age);
    }

    if config.supports_credentials {
        cors = cors.supports_credentials();
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorsConfig;

    #[test]
    fn test_setup_cors_with_config() {
        let config = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: vec!["content-type".to_string(), "org-id".to_string()],
            expose_headers: vec!["x-request-id".to_string()],
            max_age: Some(3600),
            supports_credentials: true,
        };

        // mainly ensures the builder accepts our configuration
        let _cors = setup_cors(&config);
    }
}
