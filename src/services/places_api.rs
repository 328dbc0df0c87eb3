// src/services/places_api.rs
// DOCUMENTATION: Remote place collection and image upload client
// PURPOSE: One HTTP call per method against `offered-places` and the upload function

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::{ImageUpload, PlaceData};
use crate::services::request_authorizer::{AuthorizedContext, TokenPlacement};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Remote collection holding the offered places
pub const COLLECTION: &str = "offered-places";

/// Response to a POST on the collection
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    /// Key generated by the backend
    name: String,
}

/// Client for the places backend
/// DOCUMENTATION: Stateless apart from endpoints; never touches the store
#[derive(Clone)]
pub struct PlacesApiClient {
    client: Client,
    /// Realtime database root, e.g. "https://my-project.firebaseio.com"
    database_url: String,
    /// Image upload function endpoint
    upload_url: String,
}

impl PlacesApiClient {
    pub fn new(client: Client, database_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        Self {
            client,
            database_url: database_url.into().trim_end_matches('/').to_string(),
            upload_url: upload_url.into(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, &config.places_database_url, &config.image_upload_url)
    }

    fn collection_url(&self) -> String {
        format!("{}/{}.json", self.database_url, COLLECTION)
    }

    fn record_url(&self, id: &str) -> Result<String, PlacesError> {
        check_key(id)?;
        Ok(format!("{}/{}/{}.json", self.database_url, COLLECTION, id))
    }

    /// GET the whole collection
    /// DOCUMENTATION: Returns (id, payload) pairs ordered by key. Backend
    /// keys are time-ordered, so this is creation order. An empty
    /// collection comes back as JSON `null`.
    pub async fn list(&self, ctx: &AuthorizedContext) -> Result<Vec<(String, PlaceData)>, PlacesError> {
        log::debug!("GET {}", COLLECTION);

        let response = ctx
            .send(self.client.get(self.collection_url()), TokenPlacement::QueryParam)
            .await?;

        let records: Option<BTreeMap<String, PlaceData>> = parse_body(response).await?;
        Ok(records.unwrap_or_default().into_iter().collect())
    }

    /// GET one record, `None` when absent upstream
    pub async fn get(&self, ctx: &AuthorizedContext, id: &str) -> Result<Option<PlaceData>, PlacesError> {
        let url = self.record_url(id)?;
        log::debug!("GET {}/{}", COLLECTION, id);

        let response = ctx
            .send(self.client.get(url), TokenPlacement::QueryParam)
            .await?;

        parse_body(response).await
    }

    /// POST a new record, returning the generated key
    pub async fn create(&self, ctx: &AuthorizedContext, payload: &PlaceData) -> Result<String, PlacesError> {
        log::debug!("POST {} ({})", COLLECTION, payload.title);

        let response = ctx
            .send(
                self.client.post(self.collection_url()).json(payload),
                TokenPlacement::QueryParam,
            )
            .await?;

        let created: CreatedResponse = parse_body(response).await?;
        check_key(&created.name).map_err(|_| {
            PlacesError::InvalidPayload(format!("backend returned invalid key '{}'", created.name))
        })?;
        Ok(created.name)
    }

    /// PUT the full replacement of a record
    pub async fn replace(
        &self,
        ctx: &AuthorizedContext,
        id: &str,
        payload: &PlaceData,
    ) -> Result<(), PlacesError> {
        let url = self.record_url(id)?;
        log::debug!("PUT {}/{}", COLLECTION, id);

        ctx.send(self.client.put(url).json(payload), TokenPlacement::QueryParam)
            .await?;
        Ok(())
    }

    /// Multipart upload of an image under the `image` field
    pub async fn upload_image(
        &self,
        ctx: &AuthorizedContext,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageUpload, PlacesError> {
        if bytes.is_empty() {
            return Err(PlacesError::ValidationError("image is empty".to_string()));
        }

        log::debug!("Uploading image {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| PlacesError::ValidationError(format!("Invalid mime type: {}", e)))?;
        let form = Form::new().part("image", part);

        let response = ctx
            .send(
                self.client.post(&self.upload_url).multipart(form),
                TokenPlacement::BearerHeader,
            )
            .await?;

        parse_body(response).await
    }
}

async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PlacesError> {
    response.json::<T>().await.map_err(|e| {
        log::error!("Failed to parse places response: {}", e);
        PlacesError::InvalidPayload(format!("Parse error: {}", e))
    })
}

/// Reject ids that cannot be used as a database key
fn check_key(id: &str) -> Result<(), PlacesError> {
    const FORBIDDEN: [char; 6] = ['/', '.', '#', '$', '[', ']'];
    if id.is_empty() || id.chars().any(|c| FORBIDDEN.contains(&c) || c.is_control()) {
        return Err(PlacesError::ValidationError(format!("invalid place id '{}'", id)));
    }
    Ok(())
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
