use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Application error type that can be returned from handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Authorization token is required")]
    MissingToken,

    #[error("{0}")]
    AuthenticationRequired(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("API key is required")]
    ApiKeyRequired,

    #[error("Invalid API key")]
    InvalidApiKey,

    // Request errors
    #[error("Invalid UUID format")]
    InvalidUuid,

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after_secs: u64 },

    // Resource errors
    #[error("Collection not found")]
    CollectionNotFound,

    #[error("You do not have permission to modify this collection")]
    Forbidden,

    // External store errors
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    // Internal errors
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn authentication_required() -> Self {
        AppError::AuthenticationRequired("Authentication required".to_string())
    }

    /// Prefix an upstream failure with what the service was doing
    pub fn context(self, action: &str) -> Self {
        match self {
            AppError::Upstream { status, message } => AppError::Upstream {
                status,
                message: format!("{}: {}", action, message),
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken
            | AppError::AuthenticationRequired(_)
            | AppError::InvalidToken
            | AppError::ApiKeyRequired => StatusCode::UNAUTHORIZED,
            AppError::InvalidApiKey | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidUuid | AppError::Validation(_) | AppError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::CollectionNotFound => StatusCode::NOT_FOUND,
            // 4xx answers from the store are propagated, anything else is ours
            AppError::Upstream { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingToken | AppError::AuthenticationRequired(_) => {
                "AUTHENTICATION_REQUIRED"
            }
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::ApiKeyRequired => "API_KEY_REQUIRED",
            AppError::InvalidApiKey => "INVALID_API_KEY",
            AppError::InvalidUuid => "INVALID_UUID",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidBody(_) => "INVALID_JSON",
            AppError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            AppError::CollectionNotFound => "COLLECTION_NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Extra information attached to an error envelope
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ErrorDetails {
    Message(String),
    List(Vec<String>),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(value_type = String, example = "VALIDATION_ERROR")]
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
    #[schema(example = 400)]
    pub status: u16,
}

/// JSON error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match &self {
            AppError::Validation(errors) => (
                self.to_string(),
                Some(ErrorDetails::List(errors.clone())),
            ),
            AppError::InvalidBody(reason) => {
                (self.to_string(), Some(ErrorDetails::Message(reason.clone())))
            }
            AppError::Upstream { message, .. } => {
                tracing::error!(status = status.as_u16(), "Upstream error: {}", message);
                (message.clone(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal Server Error".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
                status: status.as_u16(),
            },
        });

        let mut response = (status, body).into_response();
        if let AppError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}

// Convenient conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
