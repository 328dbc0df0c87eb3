// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod auth_session;
pub mod identity_client;
pub mod observable;
pub mod place_store;
pub mod places_api;
pub mod request_authorizer;
pub mod sync_service;

pub use auth_session::*;
pub use identity_client::*;
pub use observable::*;
pub use place_store::*;
pub use places_api::*;
pub use request_authorizer::*;
pub use sync_service::*;
