// src/config/http.rs
// DOCUMENTATION: HTTP client initialization
// PURPOSE: Build the single reqwest client shared by all remote calls

use crate::config::Config;
use crate::errors::PlacesError;
use reqwest::Client;
use std::time::Duration;

/// Initialize the shared HTTP client
/// DOCUMENTATION: Called once at startup; the client is cloned (cheaply)
/// into every API wrapper so connections are pooled
pub fn init_http_client(config: &Config) -> Result<Client, PlacesError> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    if let Some(secs) = config.http_timeout_secs {
        log::info!("HTTP request timeout: {}s", secs);
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build().map_err(|e| {
        log::error!("Failed to build HTTP client: {}", e);
        PlacesError::Configuration(format!("HTTP client: {}", e))
    })
}
