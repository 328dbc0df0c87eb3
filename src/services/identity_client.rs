// src/services/identity_client.rs
// DOCUMENTATION: Email/password identity provider client
// PURPOSE: Login and signup calls, mapping provider error codes into AuthErrorKind

use crate::config::Config;
use crate::errors::{AuthErrorKind, PlacesError};
use crate::models::{AuthErrorResponse, AuthRequest, AuthResponseData};
use reqwest::Client;

/// Identity provider REST client
/// DOCUMENTATION: Holds the web API key sent as `?key=` with each call
#[derive(Clone)]
pub struct IdentityClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL, e.g. "https://identitytoolkit.googleapis.com/v1"
    base_url: String,
    /// Web API key of the project
    api_key: String,
}

impl IdentityClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, &config.identity_api_url, &config.identity_api_key)
    }

    /// Sign in an existing account
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponseData, PlacesError> {
        self.authenticate("accounts:signInWithPassword", email, password)
            .await
    }

    /// Register a new account
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponseData, PlacesError> {
        self.authenticate("accounts:signUp", email, password).await
    }

    async fn authenticate(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponseData, PlacesError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        log::debug!("Identity request: {} for {}", endpoint, email);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&AuthRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                log::error!("Identity request failed: {}", e);
                PlacesError::NetworkError(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<AuthErrorResponse>(&body) {
                Ok(envelope) => {
                    let kind = AuthErrorKind::from_code(&envelope.error.message);
                    log::warn!(
                        "Identity provider rejected {} ({}): {} -> {:?}",
                        endpoint,
                        envelope.error.code.unwrap_or(status.as_u16()),
                        envelope.error.message,
                        kind
                    );
                    PlacesError::Auth(kind)
                }
                Err(_) => {
                    log::error!("Identity provider error {}: {}", status, body);
                    PlacesError::NetworkError(format!("API error {}: {}", status, body))
                }
            });
        }

        response.json::<AuthResponseData>().await.map_err(|e| {
            log::error!("Failed to parse identity response: {}", e);
            PlacesError::InvalidPayload(format!("Parse error: {}", e))
        })
    }
}
