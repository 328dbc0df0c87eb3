// tests/common/mod.rs
// Shared fixtures for the wiremock-backed integration tests

#![allow(dead_code)]

use chrono::{Duration, Utc};
use offered_places::config::{init_http_client, Config};
use offered_places::{AuthSession, PlaceStore, PlaceSyncService, Session};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const USER_ID: &str = "user-1";

pub struct Harness {
    pub server: MockServer,
    pub config: Config,
    pub session: Arc<AuthSession>,
    pub sync: PlaceSyncService,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let config = Config::for_base_url(&server.uri());
        let client = init_http_client(&config).expect("http client");
        let session = Arc::new(AuthSession::from_config(client.clone(), &config));
        let sync = PlaceSyncService::from_config(client, &config, Arc::clone(&session), PlaceStore::new());

        Self {
            server,
            config,
            session,
            sync,
        }
    }

    /// Start with a logged-in session
    pub async fn logged_in() -> Self {
        let harness = Self::start().await;
        harness
            .session
            .restore(Session {
                token: TOKEN.to_string(),
                user_id: USER_ID.to_string(),
                email: "test@example.com".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            })
            .expect("restore session");
        harness
    }

    pub fn store(&self) -> &PlaceStore {
        self.sync.store()
    }
}

/// Remote payload of a place, as the backend stores it
pub fn place_payload(title: &str, price: f64) -> Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "imageUrl": format!("https://img.example.com/{}.jpg", title.to_lowercase().replace(' ', "-")),
        "price": price,
        "availableFrom": "2021-01-01T00:00:00.000Z",
        "availableTo": "2021-12-31T00:00:00.000Z",
        "userId": "abc",
        "location": {
            "lat": 40.5,
            "lng": -73.25,
            "address": "Manhattan, New York"
        }
    })
}
