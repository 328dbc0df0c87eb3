// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use crate::errors::PlacesError;
use dotenv::dotenv;
use std::env;

/// Client configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the realtime database holding `offered-places`
    /// (e.g. "https://my-project.firebaseio.com")
    pub places_database_url: String,

    /// Base URL of the identity provider REST API
    pub identity_api_url: String,

    /// Web API key sent as `?key=` on login/signup
    pub identity_api_key: String,

    /// Endpoint receiving multipart image uploads
    pub image_upload_url: String,

    /// Optional request timeout; unset leaves timeouts to the transport
    pub http_timeout_secs: Option<u64>,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            places_database_url: env::var("PLACES_DATABASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),

            identity_api_url: env::var("IDENTITY_API_URL")
                .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string()),

            identity_api_key: env::var("IDENTITY_API_KEY").unwrap_or_else(|_| String::new()),

            image_upload_url: env::var("IMAGE_UPLOAD_URL")
                .unwrap_or_else(|_| "http://localhost:5001/storeImage".to_string()),

            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Configuration pointing every endpoint at one base URL
    /// DOCUMENTATION: Used against local emulators and mock servers
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Config {
            places_database_url: base.to_string(),
            identity_api_url: format!("{}/v1", base),
            identity_api_key: "test-api-key".to_string(),
            image_upload_url: format!("{}/storeImage", base),
            http_timeout_secs: None,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures the client can talk to its backends
    pub fn validate(&self) -> Result<(), PlacesError> {
        for (name, value) in [
            ("PLACES_DATABASE_URL", &self.places_database_url),
            ("IDENTITY_API_URL", &self.identity_api_url),
            ("IMAGE_UPLOAD_URL", &self.image_upload_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(PlacesError::Configuration(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, value
                )));
            }
        }

        if self.http_timeout_secs == Some(0) {
            return Err(PlacesError::Configuration(
                "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.identity_api_key.is_empty() {
            log::warn!("IDENTITY_API_KEY not configured - login and signup will fail");
        }

        Ok(())
    }
}
