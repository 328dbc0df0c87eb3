// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod auth;
pub mod image;
pub mod place;

pub use auth::*;
pub use image::*;
pub use place::*;
