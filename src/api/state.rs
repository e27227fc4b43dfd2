use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{ListingStore, ReservationLog},
    error::AppResult,
    middleware::Session,
    models::Credential,
    services::{
        providers::{DisabledImageProvider, ImageProvider, UnsplashProvider},
        AccessGate,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Current listings snapshot; replaced wholesale on reload
    pub listings: Arc<RwLock<ListingStore>>,
    pub reservations: Arc<ReservationLog>,
    pub gate: Arc<AccessGate>,
    pub images: Arc<dyn ImageProvider>,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl AppState {
    /// Creates state from already-built components
    pub fn new(
        config: Config,
        listings: ListingStore,
        gate: AccessGate,
        images: Arc<dyn ImageProvider>,
    ) -> Self {
        let reservations = ReservationLog::new(config.reservations_path.clone());
        Self {
            config: Arc::new(config),
            listings: Arc::new(RwLock::new(listings)),
            reservations: Arc::new(reservations),
            gate: Arc::new(gate),
            images,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Loads listings and credentials and picks the image provider
    ///
    /// Fails when the listings table or credentials file is malformed.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let listings = ListingStore::load(&config.listings_path)?;
        let gate = AccessGate::load(&config.credentials_path)?;

        let images: Arc<dyn ImageProvider> = match config.image_api_key() {
            Some(key) => Arc::new(UnsplashProvider::new(
                key.to_string(),
                config.unsplash_api_url.clone(),
            )),
            None => {
                tracing::warn!("UNSPLASH_ACCESS_KEY not set, listings will be shown without images");
                Arc::new(DisabledImageProvider)
            }
        };

        Ok(Self::new(config, listings, gate, images))
    }

    /// Registers a session for an admitted credential
    ///
    /// Expired sessions are pruned first so the map stays bounded by the
    /// logins made within one TTL.
    pub async fn open_session(&self, credential: &Credential) -> Session {
        let ttl = self.config.session_ttl();
        let now = Utc::now();
        let session = Session::open(credential);

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, existing| !existing.is_expired(ttl, now));
        sessions.insert(session.token, session.clone());
        session
    }

    /// Live session for `token`; an expired one is dropped and not returned
    pub async fn session(&self, token: Uuid) -> Option<Session> {
        let ttl = self.config.session_ttl();
        let mut sessions = self.sessions.write().await;

        if sessions.get(&token)?.is_expired(ttl, Utc::now()) {
            if let Some(expired) = sessions.remove(&token) {
                tracing::info!(username = %expired.username, "Session expired");
            }
            return None;
        }

        sessions.get(&token).cloned()
    }

    pub async fn close_session(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }
}
