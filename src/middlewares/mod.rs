pub mod api_key;
pub mod auth;
pub mod rate_limit;
pub mod security_headers;

pub use api_key::{api_key_middleware, API_KEY_HEADER};
pub use auth::{auth_middleware, bearer_token, AuthUser};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use security_headers::apply_security_headers;
