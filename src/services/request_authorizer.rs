// src/services/request_authorizer.rs
// DOCUMENTATION: Attach the session token to outgoing requests
// PURPOSE: One token read per logical operation, uniform status/transport error mapping

use reqwest::{RequestBuilder, Response, StatusCode};
use std::sync::Arc;

use crate::errors::PlacesError;
use crate::services::auth_session::AuthSession;

/// Where the token goes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPlacement {
    /// `?auth=<token>` (realtime database)
    QueryParam,
    /// `Authorization: Bearer <token>` (image upload function)
    BearerHeader,
}

/// Hands out authorized contexts from the current session
#[derive(Clone)]
pub struct RequestAuthorizer {
    session: Arc<AuthSession>,
}

impl RequestAuthorizer {
    pub fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Read the latest token exactly once
    /// DOCUMENTATION: Never waits for a login; fails with `Unauthenticated`
    /// when there is no active session. Reuse the returned context for every
    /// call of one operation so the token cannot change mid-flight.
    pub fn authorize(&self) -> Result<AuthorizedContext, PlacesError> {
        match self.session.current() {
            Some(session) => Ok(AuthorizedContext {
                token: session.token,
                user_id: session.user_id,
            }),
            None => {
                log::warn!("Remote call attempted without an active session");
                Err(PlacesError::Unauthenticated)
            }
        }
    }
}

/// Token and identity captured for one logical operation
#[derive(Clone)]
pub struct AuthorizedContext {
    token: String,
    user_id: String,
}

impl std::fmt::Debug for AuthorizedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedContext")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthorizedContext {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn attach(&self, request: RequestBuilder, placement: TokenPlacement) -> RequestBuilder {
        match placement {
            TokenPlacement::QueryParam => request.query(&[("auth", self.token.as_str())]),
            TokenPlacement::BearerHeader => request.bearer_auth(&self.token),
        }
    }

    /// Attach the token, send, and map failures
    /// DOCUMENTATION: transport failure and non-2xx become `NetworkError`,
    /// 401/403 become `Unauthenticated`; successful responses pass through
    pub async fn send(
        &self,
        request: RequestBuilder,
        placement: TokenPlacement,
    ) -> Result<Response, PlacesError> {
        let response = self
            .attach(request, placement)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request failed: {}", e);
                PlacesError::NetworkError(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            log::warn!("Backend rejected token for {}: {}", self.user_id, status);
            return Err(PlacesError::Unauthenticated);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("API error {}: {}", status, body);
            return Err(PlacesError::NetworkError(format!(
                "API error {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::services::IdentityClient;
    use chrono::{Duration, Utc};

    fn authorizer() -> RequestAuthorizer {
        let identity = IdentityClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "key");
        RequestAuthorizer::new(Arc::new(AuthSession::new(identity)))
    }

    #[tokio::test]
    async fn test_authorize_without_session() {
        let authorizer = authorizer();
        tokio_test::assert_err!(authorizer.authorize());
    }

    #[tokio::test]
    async fn test_context_keeps_token_after_logout() {
        let authorizer = authorizer();
        authorizer
            .session()
            .restore(Session {
                token: "tok-1".to_string(),
                user_id: "u1".to_string(),
                email: "a@b.c".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            })
            .unwrap();

        let ctx = tokio_test::assert_ok!(authorizer.authorize());
        authorizer.session().logout();

        assert_eq!(ctx.user_id(), "u1");
        let request = ctx
            .attach(
                reqwest::Client::new().get("http://localhost/x.json"),
                TokenPlacement::QueryParam,
            )
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("auth=tok-1"));
        assert!(!format!("{:?}", ctx).contains("tok-1"));
    }

    #[test]
    fn test_bearer_placement() {
        let ctx = AuthorizedContext {
            token: "abc".to_string(),
            user_id: "u".to_string(),
        };
        let request = ctx
            .attach(
                reqwest::Client::new().post("http://localhost/upload"),
                TokenPlacement::BearerHeader,
            )
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer abc"
        );
    }
}
