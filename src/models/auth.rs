// src/models/auth.rs
// DOCUMENTATION: Identity provider request/response models and the session value
// PURPOSE: Map login/signup responses into an authenticated session

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PlacesError;

/// Body of `accounts:signInWithPassword` and `accounts:signUp`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Successful identity provider response
/// DOCUMENTATION: `expires_in` is a decimal string of seconds
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseData {
    pub id_token: String,
    pub email: String,
    #[serde(default)]
    pub refresh_token: String,
    pub local_id: String,
    pub expires_in: String,
    #[serde(default)]
    pub registered: Option<bool>,
}

/// Error envelope `{"error": {"message": "EMAIL_NOT_FOUND", ...}}`
#[derive(Debug, Deserialize)]
pub struct AuthErrorResponse {
    pub error: AuthErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Bearer token attached to every remote call
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a provider response received at `now`
    pub fn from_response(data: AuthResponseData, now: DateTime<Utc>) -> Result<Self, PlacesError> {
        let seconds: i64 = data.expires_in.trim().parse().map_err(|_| {
            PlacesError::InvalidPayload(format!("invalid expiresIn '{}'", data.expires_in))
        })?;

        if data.id_token.is_empty() || data.local_id.is_empty() {
            return Err(PlacesError::InvalidPayload(
                "auth response without token or user id".to_string(),
            ));
        }

        let expires_at = Some(seconds)
            .filter(|s| *s > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                PlacesError::InvalidPayload(format!("unusable expiresIn '{}'", data.expires_in))
            })?;

        Ok(Session {
            token: data.id_token,
            user_id: data.local_id,
            email: data.email,
            expires_at,
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - now).to_std().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expires_in: &str) -> AuthResponseData {
        AuthResponseData {
            id_token: "token-1".to_string(),
            email: "test@example.com".to_string(),
            refresh_token: "refresh".to_string(),
            local_id: "user-1".to_string(),
            expires_in: expires_in.to_string(),
            registered: Some(true),
        }
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session::from_response(response("3600"), now).unwrap();

        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.remaining_at(now).as_secs(), 3600);
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::seconds(3600)));
        assert_eq!(session.remaining_at(now + Duration::hours(2)).as_secs(), 0);
    }

    #[test]
    fn test_bad_expires_in() {
        assert!(matches!(
            Session::from_response(response("soon"), Utc::now()),
            Err(PlacesError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_out_of_range_expires_in() {
        let now = Utc::now();
        for value in ["9223372036854775807", "-5", "0"] {
            assert!(
                matches!(
                    Session::from_response(response(value), now),
                    Err(PlacesError::InvalidPayload(_))
                ),
                "expiresIn {} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_response_deserialize() {
        let json = serde_json::json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "u1",
            "email": "a@b.c",
            "idToken": "tok",
            "registered": true,
            "refreshToken": "r",
            "expiresIn": "3600"
        });

        let data: AuthResponseData = serde_json::from_value(json).unwrap();
        assert_eq!(data.local_id, "u1");
        assert_eq!(data.expires_in, "3600");
    }
}
