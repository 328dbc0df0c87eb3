// src/models/image.rs
// DOCUMENTATION: Image upload response model

use serde::{Deserialize, Serialize};

/// Remote reference to an uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    /// Public URL to store in `Place::image_url`
    pub image_url: String,
    /// Storage path of the object
    pub image_path: String,
}
