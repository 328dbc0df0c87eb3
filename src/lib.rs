// src/lib.rs
// DOCUMENTATION: Client-side sync layer for offered places
// PURPOSE: Session handling, authorized requests, observable place store and sync operations

pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use config::Config;
pub use errors::{AuthErrorKind, PlacesError};
pub use models::{ImageUpload, NewPlace, Place, PlaceEdit, PlaceLocation, Session};
pub use services::{
    AuthSession, AuthorizedContext, Observable, PlaceStore, PlaceSyncService, RequestAuthorizer,
    Subscription,
};
