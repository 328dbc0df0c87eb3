// src/services/sync_service.rs
// DOCUMENTATION: Place synchronization service
// PURPOSE: Keep the local PlaceStore consistent with the remote collection

use std::sync::Arc;
use validator::Validate;

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::{ImageUpload, NewPlace, Place, PlaceEdit};
use crate::services::auth_session::AuthSession;
use crate::services::place_store::PlaceStore;
use crate::services::places_api::PlacesApiClient;
use crate::services::request_authorizer::{AuthorizedContext, RequestAuthorizer};

/// Sync service for the offered places
/// DOCUMENTATION: Every operation follows the same steps:
/// 1. Validate local input (no network on failure)
/// 2. Read the token once through the RequestAuthorizer
/// 3. Perform the remote call(s)
/// 4. Map payloads into validated Place entities
/// 5. Write into the PlaceStore, only after everything succeeded
///
/// Calls are single-shot; retrying is up to the caller.
pub struct PlaceSyncService {
    api: PlacesApiClient,
    authorizer: RequestAuthorizer,
    store: PlaceStore,
}

impl PlaceSyncService {
    pub fn new(api: PlacesApiClient, authorizer: RequestAuthorizer, store: PlaceStore) -> Self {
        Self {
            api,
            authorizer,
            store,
        }
    }

    pub fn from_config(
        client: reqwest::Client,
        config: &Config,
        session: Arc<AuthSession>,
        store: PlaceStore,
    ) -> Self {
        Self::new(
            PlacesApiClient::from_config(client, config),
            RequestAuthorizer::new(session),
            store,
        )
    }

    pub fn store(&self) -> &PlaceStore {
        &self.store
    }

    /// Fetch the whole collection and replace the store
    pub async fn fetch_all(&self) -> Result<Vec<Place>, PlacesError> {
        let ctx = self.authorizer.authorize()?;
        self.fetch_all_with(&ctx).await
    }

    async fn fetch_all_with(&self, ctx: &AuthorizedContext) -> Result<Vec<Place>, PlacesError> {
        log::info!("Fetching all places");

        let records = self.api.list(ctx).await?;
        let places = records
            .into_iter()
            .map(|(id, data)| Place::from_payload(&id, data))
            .collect::<Result<Vec<_>, _>>()?;

        self.store.replace_all(places.clone())?;
        log::info!("Fetched {} places", places.len());
        Ok(places)
    }

    /// Fetch a single place
    /// DOCUMENTATION: A cached copy is refreshed in place; an uncached place
    /// is returned without being added to the store.
    pub async fn fetch_one(&self, id: &str) -> Result<Place, PlacesError> {
        let ctx = self.authorizer.authorize()?;
        log::info!("Fetching place {}", id);

        let data = self
            .api
            .get(&ctx, id)
            .await?
            .ok_or_else(|| PlacesError::NotFound(id.to_string()))?;
        let place = Place::from_payload(id, data)?;

        match self.store.replace_one(id, place.clone()) {
            Ok(()) | Err(PlacesError::NotFound(_)) => Ok(place),
            Err(e) => Err(e),
        }
    }

    /// Fill a cold cache
    /// DOCUMENTATION: Performs exactly one fetch_all when the store is empty.
    /// Returns whether a fetch happened.
    pub async fn ensure_loaded(&self) -> Result<bool, PlacesError> {
        let ctx = self.authorizer.authorize()?;
        self.ensure_loaded_with(&ctx).await
    }

    async fn ensure_loaded_with(&self, ctx: &AuthorizedContext) -> Result<bool, PlacesError> {
        if !self.store.is_empty() {
            return Ok(false);
        }
        log::debug!("Store empty, rehydrating before mutation");
        self.fetch_all_with(ctx).await?;
        Ok(true)
    }

    /// Create a place owned by the logged-in user
    /// DOCUMENTATION: The entity only enters the store once the backend has
    /// assigned its key, so no placeholder id is ever observable.
    pub async fn create(&self, new_place: NewPlace) -> Result<Place, PlacesError> {
        new_place.validate()?;
        let ctx = self.authorizer.authorize()?;

        log::info!("Creating place '{}' for {}", new_place.title, ctx.user_id());

        let payload = new_place.to_payload(ctx.user_id());
        payload.check().map_err(PlacesError::ValidationError)?;
        let id = self.api.create(&ctx, &payload).await?;
        let place = Place::from_payload(&id, payload)?;

        self.store.append(place.clone())?;
        log::info!("Created place {}", id);
        Ok(place)
    }

    /// Update title, description and price of a place
    /// DOCUMENTATION: Rehydrates a cold cache first (ensure_loaded), then
    /// PUTs the full record. Image, window, owner and location are kept.
    pub async fn update(&self, id: &str, edit: PlaceEdit) -> Result<Place, PlacesError> {
        edit.validate()?;
        let ctx = self.authorizer.authorize()?;

        self.ensure_loaded_with(&ctx).await?;

        let current = self
            .store
            .find(id)
            .ok_or_else(|| PlacesError::NotFound(id.to_string()))?;
        let updated = current.with_edit(&edit);
        let payload = updated.to_payload();
        payload.check().map_err(PlacesError::ValidationError)?;

        log::info!("Updating place {}", id);
        self.api.replace(&ctx, id, &payload).await?;

        if let Err(e) = self.store.replace_one(id, updated.clone()) {
            // A concurrent fetch_all dropped the entry while the PUT was in flight
            log::warn!("Place {} updated remotely but not cached: {}", id, e);
        }
        Ok(updated)
    }

    /// Upload an image for a future place
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImageUpload, PlacesError> {
        let ctx = self.authorizer.authorize()?;
        let upload = self.api.upload_image(&ctx, file_name, bytes).await?;
        log::info!("Uploaded image to {}", upload.image_path);
        Ok(upload)
    }

    /// Cached places owned by `user_id`
    pub fn offers_of(&self, user_id: &str) -> Vec<Place> {
        self.store
            .current()
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect()
    }
}
