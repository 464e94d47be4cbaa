use axum::{extract::rejection::JsonRejection, Json};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::validators::is_valid_uuid;

/// Reject identifiers that are not canonical UUIDs before touching the store
pub fn ensure_uuid(id: &str) -> AppResult<()> {
    if is_valid_uuid(id) {
        Ok(())
    } else {
        Err(AppError::InvalidUuid)
    }
}

/// Unwrap a raw JSON body, mapping extractor rejections to our envelope
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> AppResult<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))
}

/// Run a validator over the raw body, then decode it into the typed request
pub fn validated<T: DeserializeOwned>(
    body: Value,
    validate: fn(&Value) -> Vec<String>,
) -> AppResult<T> {
    let errors = validate(&body);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    serde_json::from_value(body).map_err(|e| AppError::Validation(vec![e.to_string()]))
}

/// Optional query value, with empty strings treated as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
