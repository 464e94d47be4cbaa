use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use collection_service::build_router;
use collection_service::config::{AuthMode, Config, RateLimitConfig};
use collection_service::error::{AppError, AppResult};
use collection_service::models::{Collection, CollectionChanges, CollectionQuery, NewCollection};
use collection_service::repositories::{CollectionStore, InMemoryCollectionStore};
use collection_service::services::StaticIdentityVerifier;
use collection_service::state::AppState;

pub const TEST_API_KEY: &str = "test-service-api-key";

/// Test configuration
pub fn test_config() -> Config {
    Config {
        supabase_url: "http://localhost:54321".to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        owner_relation: "students!collections_owner_id_fkey".to_string(),
        auth_mode: AuthMode::Bearer,
        api_key: None,
        rate_limit: RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        },
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

/// Service-to-service variant: API key required, bearer optional
pub fn api_key_config() -> Config {
    Config {
        auth_mode: AuthMode::ApiKey,
        api_key: Some(TEST_API_KEY.to_string()),
        ..test_config()
    }
}

/// Test application wrapper
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: InMemoryCollectionStore,
    pub identity: StaticIdentityVerifier,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        // In-memory backends keep tests independent of the hosted store
        let store = InMemoryCollectionStore::new();
        let identity = StaticIdentityVerifier::new();

        let state = AppState::with_backends(
            config,
            Arc::new(store.clone()),
            Arc::new(identity.clone()),
        );

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            state,
            store,
            identity,
        }
    }

    /// App whose store fails every call, to prove a request never reached it
    pub fn with_unreachable_store() -> Self {
        let store = InMemoryCollectionStore::new();
        let identity = StaticIdentityVerifier::new();

        let state = AppState::with_backends(
            test_config(),
            Arc::new(UnreachableStore),
            Arc::new(identity.clone()),
        );

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            state,
            store,
            identity,
        }
    }
}

struct UnreachableStore;

fn unreachable() -> AppError {
    AppError::Upstream {
        status: None,
        message: "store should not have been called".to_string(),
    }
}

#[async_trait]
impl CollectionStore for UnreachableStore {
    async fn list(&self, _: Option<&str>, _: &CollectionQuery) -> AppResult<Vec<Collection>> {
        Err(unreachable())
    }

    async fn find_by_id(&self, _: Option<&str>, _: &str) -> AppResult<Option<Collection>> {
        Err(unreachable())
    }

    async fn insert(&self, _: Option<&str>, _: &NewCollection) -> AppResult<Collection> {
        Err(unreachable())
    }

    async fn update(
        &self,
        _: Option<&str>,
        _: &str,
        _: &str,
        _: &CollectionChanges,
    ) -> AppResult<Option<Collection>> {
        Err(unreachable())
    }

    async fn delete(&self, _: Option<&str>, _: &str, _: &str) -> AppResult<bool> {
        Err(unreachable())
    }
}
