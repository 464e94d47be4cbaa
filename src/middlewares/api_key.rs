use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Service-to-service gate: compares `x-api-key` against the configured secret.
/// A no-op when no secret is configured.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::ApiKeyRequired)?;

    if !keys_match(provided, expected) {
        tracing::debug!(path = %request.uri().path(), "Rejected invalid API key");
        return Err(AppError::InvalidApiKey);
    }

    Ok(next.run(request).await)
}

/// Constant-time comparison; differing lengths compare unequal
fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
