use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult, ErrorResponse};
use crate::handlers::common::{double_option, ensure_uuid, json_body, non_empty, validated};
use crate::middlewares::AuthUser;
use crate::models::{Collection, CollectionFilters, Scope};
use crate::services::{CollectionService, CreateCollection, UpdateCollection};
use crate::state::AppState;
use crate::validators::{validate_create, validate_update};

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollectionRequest {
    #[schema(max_length = 255, example = "My Study Materials")]
    pub name: String,
    #[schema(example = "Collection of important study resources")]
    pub description: Option<String>,
    #[schema(default = false)]
    pub is_public: Option<bool>,
    #[schema(example = json!(["computer-science", "algorithms"]))]
    pub tags: Option<Vec<String>>,
    #[schema(example = json!(["resource-uuid-1"]))]
    pub refs: Option<Vec<String>>,
}

impl From<CreateCollectionRequest> for CreateCollection {
    fn from(r: CreateCollectionRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            is_public: r.is_public,
            tags: r.tags,
            refs: r.refs,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCollectionRequest {
    #[schema(max_length = 255)]
    pub name: Option<String>,
    /// `null` clears the description
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub refs: Option<Vec<String>>,
}

impl From<UpdateCollectionRequest> for UpdateCollection {
    fn from(r: UpdateCollectionRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            is_public: r.is_public,
            tags: r.tags,
            refs: r.refs,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCollectionsParams {
    /// "true" or "false"
    pub is_public: Option<String>,
    /// Only collections whose tags contain this value
    pub tag: Option<String>,
    /// Scope: all, my or public
    pub filter: Option<String>,
    /// Case-insensitive match on name or description
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionListResponse {
    pub success: bool,
    pub collections: Vec<Collection>,
    pub count: usize,
    #[schema(example = "all")]
    pub filter: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub collection: Collection,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl ListCollectionsParams {
    fn into_filters(self, caller_id: Option<String>) -> AppResult<CollectionFilters> {
        let scope = match non_empty(self.filter).as_deref() {
            None => Scope::All,
            Some(value) => Scope::parse(value).ok_or_else(|| {
                AppError::Validation(vec!["filter must be one of: all, my, public".to_string()])
            })?,
        };

        let is_public = match non_empty(self.is_public).as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(_) => {
                return Err(AppError::Validation(vec![
                    "is_public must be 'true' or 'false'".to_string(),
                ]))
            }
        };

        Ok(CollectionFilters {
            is_public,
            tag: non_empty(self.tag),
            scope,
            search: non_empty(self.search),
            caller_id,
        })
    }
}

// ============ Handlers ============

/// List collections
#[utoipa::path(
    get,
    path = "/api/collections",
    params(ListCollectionsParams),
    responses(
        (status = 200, description = "Matching collections, newest first", body = CollectionListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("api_key" = [])
    ),
    tag = "Collections"
)]
pub async fn list_collections(
    user: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<ListCollectionsParams>,
) -> AppResult<Json<CollectionListResponse>> {
    let token = user.as_ref().map(|u| u.token.as_str());
    let filters = params.into_filters(user.as_ref().map(|u| u.id.clone()))?;

    let list = CollectionService::list(state.store.as_ref(), token, filters).await?;

    Ok(Json(CollectionListResponse {
        success: true,
        count: list.count,
        collections: list.collections,
        filter: list.filter.to_string(),
    }))
}

/// Get a collection by ID
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(
        ("id" = String, Path, description = "Collection ID (UUID)")
    ),
    responses(
        (status = 200, description = "Collection details", body = CollectionResponse),
        (status = 400, description = "Invalid UUID", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Collection not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("api_key" = [])
    ),
    tag = "Collections"
)]
pub async fn get_collection(
    user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CollectionResponse>> {
    ensure_uuid(&id)?;
    let token = user.as_ref().map(|u| u.token.as_str());

    let collection = CollectionService::get_by_id(state.store.as_ref(), token, &id)
        .await?
        .ok_or(AppError::CollectionNotFound)?;

    Ok(Json(CollectionResponse {
        success: true,
        message: None,
        collection,
    }))
}

/// Create a new collection owned by the caller
#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created successfully", body = CollectionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn create_collection(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CollectionResponse>)> {
    let request: CreateCollectionRequest = validated(json_body(payload)?, validate_create)?;

    let collection = CollectionService::create(
        state.store.as_ref(),
        Some(user.token.as_str()),
        request.into(),
        &user.id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CollectionResponse {
            success: true,
            message: Some("Collection created successfully".to_string()),
            collection,
        }),
    ))
}

/// Update the supplied fields of a collection
#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(
        ("id" = String, Path, description = "Collection ID (UUID)")
    ),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Collection updated successfully", body = CollectionResponse),
        (status = 400, description = "Invalid UUID or validation error", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Collection not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn update_collection(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<CollectionResponse>> {
    ensure_uuid(&id)?;
    let request: UpdateCollectionRequest = validated(json_body(payload)?, validate_update)?;

    let collection = CollectionService::update(
        state.store.as_ref(),
        Some(user.token.as_str()),
        &id,
        request.into(),
        &user.id,
    )
    .await?;

    Ok(Json(CollectionResponse {
        success: true,
        message: Some("Collection updated successfully".to_string()),
        collection,
    }))
}

/// Delete a collection
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(
        ("id" = String, Path, description = "Collection ID (UUID)")
    ),
    responses(
        (status = 200, description = "Collection deleted successfully", body = MessageResponse),
        (status = 400, description = "Invalid UUID", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Collection not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn delete_collection(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    ensure_uuid(&id)?;

    CollectionService::delete(state.store.as_ref(), Some(user.token.as_str()), &id, &user.id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Collection deleted successfully".to_string(),
    }))
}
