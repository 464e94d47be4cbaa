pub mod collection;
pub mod common;
pub mod health;

pub use collection::{
    create_collection, delete_collection, get_collection, list_collections, update_collection,
    CollectionListResponse, CollectionResponse, CreateCollectionRequest, ListCollectionsParams,
    MessageResponse, UpdateCollectionRequest,
};
pub use health::{health, HealthResponse};
