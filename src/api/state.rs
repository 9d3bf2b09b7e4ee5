use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::SharedStore;
use crate::error::AppResult;
use crate::services::{
    providers::CatalogProvider, AccessGate, CatalogService, ContentPolicy, ProfileSession,
    ProfileStore, Watchlist,
};

/// Shared application state.
///
/// Every service reads and writes through the one injected store.
#[derive(Clone)]
pub struct AppState {
    pub profiles: ProfileStore,
    pub session: Arc<RwLock<ProfileSession>>,
    pub watchlist: Watchlist,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        provider: Arc<dyn CatalogProvider>,
        policy: ContentPolicy,
        max_pin_attempts: Option<u32>,
    ) -> AppResult<Self> {
        let policy = Arc::new(policy);
        let profiles = ProfileStore::new(store.clone())?;
        let session = ProfileSession::new(profiles.clone(), AccessGate::new(max_pin_attempts));

        Ok(Self {
            watchlist: Watchlist::new(store, profiles.clone(), policy.clone()),
            catalog: CatalogService::new(provider, policy),
            session: Arc::new(RwLock::new(session)),
            profiles,
        })
    }
}
