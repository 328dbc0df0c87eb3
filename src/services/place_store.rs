// src/services/place_store.rs
// DOCUMENTATION: In-memory store of known places
// PURPOSE: Single source of truth for every consumer, mutated only by sync operations

use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::errors::PlacesError;
use crate::models::Place;
use crate::services::observable::{Observable, Subscription};

/// Insertion-ordered, id-unique cache of places
/// DOCUMENTATION: Cloning the store yields another handle to the same
/// cache. Each mutation is applied atomically: subscribers only ever see
/// complete snapshots, in the same order.
#[derive(Clone)]
pub struct PlaceStore {
    places: Observable<Vec<Place>>,
}

impl Default for PlaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceStore {
    pub fn new() -> Self {
        Self {
            places: Observable::new(Vec::new()),
        }
    }

    /// Synchronous snapshot
    pub fn current(&self) -> Vec<Place> {
        self.places.get()
    }

    pub fn find(&self, id: &str) -> Option<Place> {
        self.places
            .with(|places| places.iter().find(|p| p.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.places.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver the current snapshot now and every later snapshot
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Vec<Place>) + Send + Sync + 'static,
    {
        self.places.subscribe(observer)
    }

    /// Snapshot stream for async consumers
    pub fn watch(&self) -> (Subscription, UnboundedReceiver<Vec<Place>>) {
        self.places.watch()
    }

    /// Replace the whole cache
    pub fn replace_all(&self, places: Vec<Place>) -> Result<(), PlacesError> {
        {
            let mut seen = HashSet::with_capacity(places.len());
            if let Some(dup) = places.iter().find(|p| !seen.insert(p.id.as_str())) {
                return Err(PlacesError::ValidationError(format!(
                    "duplicate place id in snapshot: {}",
                    dup.id
                )));
            }
        }

        let count = places.len();
        self.places.set(places);
        log::debug!("Store replaced: {} places", count);
        Ok(())
    }

    /// Add a place at the end
    pub fn append(&self, place: Place) -> Result<(), PlacesError> {
        let id = place.id.clone();
        self.places.update(|places| {
            if places.iter().any(|p| p.id == place.id) {
                return Err(PlacesError::AlreadyExists(place.id.clone()));
            }
            places.push(place);
            Ok(())
        })?;
        log::debug!("Store append: {}", id);
        Ok(())
    }

    /// Replace the entry with `id`, keeping its position
    pub fn replace_one(&self, id: &str, place: Place) -> Result<(), PlacesError> {
        if place.id != id {
            return Err(PlacesError::ValidationError(format!(
                "replacement for {} carries id {}",
                id, place.id
            )));
        }

        self.places.update(|places| match places.iter_mut().find(|p| p.id == id) {
            Some(slot) => {
                *slot = place;
                Ok(())
            }
            None => Err(PlacesError::NotFound(id.to_string())),
        })?;
        log::debug!("Store replace: {}", id);
        Ok(())
    }
}
