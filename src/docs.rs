use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::error::{ErrorBody, ErrorDetails, ErrorResponse};
use crate::handlers::{
    self, CollectionListResponse, CollectionResponse, CreateCollectionRequest, HealthResponse,
    MessageResponse, UpdateCollectionRequest,
};
use crate::middlewares::API_KEY_HEADER;
use crate::models::{Collection, OwnerSummary};

/// Security schemes for bearer tokens and service API keys
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Collection Service API",
        description = "Collection microservice API documentation"
    ),
    paths(
        handlers::health::health,
        handlers::collection::list_collections,
        handlers::collection::get_collection,
        handlers::collection::create_collection,
        handlers::collection::update_collection,
        handlers::collection::delete_collection,
    ),
    components(schemas(
        Collection,
        OwnerSummary,
        CreateCollectionRequest,
        UpdateCollectionRequest,
        CollectionResponse,
        CollectionListResponse,
        MessageResponse,
        HealthResponse,
        ErrorResponse,
        ErrorBody,
        ErrorDetails,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Collections", description = "Collection management endpoints")
    )
)]
pub struct ApiDoc;
