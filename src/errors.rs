// src/errors.rs
// DOCUMENTATION: Custom error types for the sync layer
// PURPOSE: Centralized error taxonomy shared by session, store and sync service

use thiserror::Error;

/// Reason a login or signup was rejected by the identity provider
/// DOCUMENTATION: Parsed from the provider's `error.message` code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    EmailExists,
    EmailNotFound,
    InvalidPassword,
    Unknown,
}

impl AuthErrorKind {
    /// Map a provider error code (e.g. `EMAIL_NOT_FOUND`) to a kind
    /// Codes may carry a ` : detail` suffix which is ignored.
    pub fn from_code(code: &str) -> Self {
        let code = code.split(" : ").next().unwrap_or_default().trim();
        match code {
            "EMAIL_EXISTS" => AuthErrorKind::EmailExists,
            "EMAIL_NOT_FOUND" => AuthErrorKind::EmailNotFound,
            "INVALID_PASSWORD" => AuthErrorKind::InvalidPassword,
            _ => AuthErrorKind::Unknown,
        }
    }

    /// Message shown to the user when authentication fails
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorKind::EmailExists => "This email address exists already.",
            AuthErrorKind::EmailNotFound => "Email address could not be found",
            AuthErrorKind::InvalidPassword => "Password is incorrect",
            AuthErrorKind::Unknown => "Could not register. Please try again",
        }
    }
}

/// Application-specific error types
/// DOCUMENTATION: Every public operation of the crate returns this error.
/// Failures never leave the place store partially updated.
#[derive(Error, Debug)]
pub enum PlacesError {
    /// Bad local input, rejected before any network call
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No session, expired session, or token rejected by the backend
    #[error("Not authenticated")]
    Unauthenticated,

    /// Transport failure or non-2xx response
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Place not found with id: {0}")]
    NotFound(String),

    #[error("Place already exists: {0}")]
    AlreadyExists(String),

    /// Successful response whose body does not describe valid places
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Authentication failed: {}", .0.user_message())]
    Auth(AuthErrorKind),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PlacesError {
    /// User-facing text for this error
    /// DOCUMENTATION: Auth failures use the provider mapping table,
    /// everything else gets a generic message.
    pub fn user_message(&self) -> String {
        match self {
            PlacesError::Auth(kind) => kind.user_message().to_string(),
            PlacesError::Unauthenticated => "Your session has expired. Please log in again".to_string(),
            PlacesError::NotFound(_) => "Place could not be fetched. Please try again later.".to_string(),
            PlacesError::ValidationError(msg) => msg.clone(),
            _ => "Something went wrong. Please try again".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for PlacesError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PlacesError::ValidationError(errors.to_string())
    }
}
