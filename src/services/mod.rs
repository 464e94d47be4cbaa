pub mod auth;
pub mod collection;

pub use auth::{Identity, IdentityVerifier, StaticIdentityVerifier, SupabaseAuth};
pub use collection::{CollectionService, CreateCollection, UpdateCollection};
