// src/services/auth_session.rs
// DOCUMENTATION: Current authentication session
// PURPOSE: Login/signup/logout, observable token and user id, automatic expiry

use chrono::Utc;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::Session;
use crate::services::identity_client::IdentityClient;
use crate::services::observable::{Observable, Subscription};

/// Holder of the one active session of a client
/// DOCUMENTATION: Share it behind an `Arc`. A successful login or signup
/// replaces any previous session and (re)starts the expiry timer.
pub struct AuthSession {
    identity: IdentityClient,
    session: Observable<Option<Session>>,
    expiry_timer: Mutex<Option<JoinHandle<()>>>,
}

impl AuthSession {
    pub fn new(identity: IdentityClient) -> Self {
        Self {
            identity,
            session: Observable::new(None),
            expiry_timer: Mutex::new(None),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(IdentityClient::from_config(client, config))
    }

    /// Log in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, PlacesError> {
        log::info!("Logging in {}", email);
        let data = self.identity.sign_in(email, password).await?;
        let session = Session::from_response(data, Utc::now())?;
        self.install(session.clone());
        Ok(session)
    }

    /// Create an account and log it in
    pub async fn signup(&self, email: &str, password: &str) -> Result<Session, PlacesError> {
        log::info!("Signing up {}", email);
        let data = self.identity.sign_up(email, password).await?;
        let session = Session::from_response(data, Utc::now())?;
        self.install(session.clone());
        Ok(session)
    }

    /// Install a session obtained earlier (e.g. persisted by the host app)
    pub fn restore(&self, session: Session) -> Result<(), PlacesError> {
        if session.is_expired_at(Utc::now()) {
            log::info!("Refusing to restore expired session for {}", session.user_id);
            return Err(PlacesError::Unauthenticated);
        }
        self.install(session);
        Ok(())
    }

    /// Clear the session immediately and cancel the expiry timer
    pub fn logout(&self) {
        self.cancel_timer();
        self.session.set(None);
        log::info!("Logged out");
    }

    /// Active, unexpired session
    pub fn current(&self) -> Option<Session> {
        let now = Utc::now();
        self.session
            .with(|s| s.as_ref().filter(|s| !s.is_expired_at(now)).cloned())
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn user_id(&self) -> Option<String> {
        self.current().map(|s| s.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Observe session changes (`None` when logged out or expired)
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Option<Session>) + Send + Sync + 'static,
    {
        self.session.subscribe(observer)
    }

    pub fn watch(&self) -> (Subscription, UnboundedReceiver<Option<Session>>) {
        self.session.watch()
    }

    fn install(&self, session: Session) {
        let remaining = session.remaining_at(Utc::now());
        let token = session.token.clone();
        let user_id = session.user_id.clone();

        self.session.set(Some(session));
        log::info!(
            "Session active for {} (expires in {}s)",
            user_id,
            remaining.as_secs()
        );

        let timer = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let holder = self.session.clone();
                Some(handle.spawn(async move {
                    tokio::time::sleep(remaining).await;
                    // Only clear the session this timer was started for
                    let cleared = holder.update(|current| {
                        if current.as_ref().is_some_and(|active| active.token == token) {
                            *current = None;
                            Ok(())
                        } else {
                            Err(())
                        }
                    });
                    if cleared.is_ok() {
                        log::info!("Session for {} expired", user_id);
                    }
                }))
            }
            Err(_) => {
                log::warn!("No async runtime; session expiry enforced on read only");
                None
            }
        };

        let mut slot = self
            .expiry_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *slot, timer) {
            previous.abort();
        }
    }

    fn cancel_timer(&self) {
        let mut slot = self
            .expiry_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = slot.take() {
            timer.abort();
        }
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
