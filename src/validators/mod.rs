pub mod collection;

pub use collection::{is_valid_uuid, validate_create, validate_update, MAX_NAME_LENGTH};
