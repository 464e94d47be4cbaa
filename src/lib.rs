// Library crate for the collection service
// Exports modules for use by the server binary and tests

pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod validators;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::handlers::{
    create_collection, delete_collection, get_collection, health, list_collections,
    update_collection,
};
use crate::middlewares::{
    api_key_middleware, apply_security_headers, auth_middleware, rate_limit_middleware,
};
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    // Gated routes. Layers run outermost-last-added: rate limit, bearer auth, API key.
    let protected_routes = Router::new()
        .route(
            "/api/collections",
            get(list_collections).post(create_collection),
        )
        .route(
            "/api/collections/{id}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let app = Router::new()
        // Public routes
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Protected routes
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    apply_security_headers(app)
}
