use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::Identity;
use crate::state::AppState;

/// Authenticated caller, resolved by the identity service
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    /// Raw bearer token, forwarded to the store on every call
    pub token: String,
}

impl AuthUser {
    pub fn new(identity: Identity, token: &str) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            token: token.to_string(),
        }
    }
}

/// Extractor for AuthUser - can be used directly in handlers
/// Example: `async fn handler(user: AuthUser) -> ... { }`
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(AppError::authentication_required)
    }
}

/// `Option<AuthUser>` for routes that also serve anonymous callers
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().cloned())
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Auth middleware - verifies the bearer token with the identity service and
/// injects AuthUser into request extensions. Without a token the request is
/// rejected, unless the auth mode makes bearer tokens optional.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        if state.config.auth_mode.requires_bearer() {
            tracing::debug!(path = %request.uri().path(), "Missing bearer token");
            return Err(AppError::MissingToken);
        }
        return Ok(next.run(request).await);
    };

    let identity = state.identity.verify(&token).await.map_err(|err| {
        tracing::debug!(error = %err, "Bearer token verification failed");
        err
    })?;

    request
        .extensions_mut()
        .insert(AuthUser::new(identity, &token));

    Ok(next.run(request).await)
}
