use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token verification is delegated; implementations only answer "who is this"
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AppResult<Identity>;
}

/// Verifies tokens against the hosted auth endpoint (`/auth/v1/user`)
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseAuth {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::from(e).context("Failed to verify token"))?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::InvalidToken),
            // The auth service answers bad or expired JWTs with 4xx bodies as well
            status if status.is_client_error() => {
                tracing::debug!(status = status.as_u16(), "Token rejected by identity service");
                Err(AppError::InvalidToken)
            }
            status => Err(AppError::Upstream {
                status: Some(status.as_u16()),
                message: "Failed to verify token: identity service unavailable".to_string(),
            }),
        }
    }
}

/// Fixed token table, for tests and local development
#[derive(Clone, Default)]
pub struct StaticIdentityVerifier {
    tokens: Arc<RwLock<HashMap<String, Identity>>>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, token: impl Into<String>, identity: Identity) {
        self.tokens.write().await.insert(token.into(), identity);
    }

    pub async fn revoke(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
