use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::middlewares::RateLimiter;
use crate::repositories::{CollectionStore, SupabaseCollectionStore};
use crate::services::{IdentityVerifier, SupabaseAuth};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Remote `collections` relation
    pub store: Arc<dyn CollectionStore>,
    /// Bearer token verification
    pub identity: Arc<dyn IdentityVerifier>,
    /// `None` when rate limiting is disabled
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// Create a new AppState talking to the hosted backend
    pub fn new(config: Config) -> Result<Self, AppStateError> {
        let client = Client::builder()
            .user_agent(concat!("collection-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppStateError::HttpClient(e.to_string()))?;

        let store: Arc<dyn CollectionStore> =
            Arc::new(SupabaseCollectionStore::new(client.clone(), &config));
        let identity: Arc<dyn IdentityVerifier> = Arc::new(SupabaseAuth::new(client, &config));

        Ok(Self::with_backends(config, store, identity))
    }

    /// Create AppState with custom backends (for testing)
    pub fn with_backends(
        config: Config,
        store: Arc<dyn CollectionStore>,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let rate_limiter = RateLimiter::from_config(&config.rate_limit).map(Arc::new);

        Self {
            config,
            store,
            identity,
            rate_limiter,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
