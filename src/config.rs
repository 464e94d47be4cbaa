use std::env;
use std::str::FromStr;

/// Which credentials the gating chain demands on protected routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Every request must carry a verified bearer token
    Bearer,
    /// Service-to-service: `x-api-key` is required, bearer tokens are optional
    ApiKey,
}

impl AuthMode {
    pub fn requires_bearer(&self) -> bool {
        matches!(self, AuthMode::Bearer)
    }
}

impl FromStr for AuthMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bearer" => Ok(AuthMode::Bearer),
            "api_key" | "api-key" | "apikey" => Ok(AuthMode::ApiKey),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per caller within one window
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 900,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // External store
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub owner_relation: String,

    // Gating
    pub auth_mode: AuthMode,
    pub api_key: Option<String>,
    pub rate_limit: RateLimitConfig,

    // Server
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        let auth_mode = match env::var("AUTH_MODE") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("AUTH_MODE"))?,
            Err(_) => AuthMode::Bearer,
        };

        let api_key = env::var("API_KEY").ok().filter(|key| !key.is_empty());
        if auth_mode == AuthMode::ApiKey && api_key.is_none() {
            return Err(ConfigError::Missing("API_KEY"));
        }

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            enabled: parse_or("RATE_LIMIT_ENABLED", defaults.enabled)?,
            max_requests: parse_or("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests)?,
            window_secs: parse_or("RATE_LIMIT_WINDOW_SECS", defaults.window_secs)?,
        };
        if rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_MAX_REQUESTS"));
        }
        if rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECS"));
        }

        Ok(Self {
            // External store
            supabase_url: env::var("SUPABASE_URL")
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            owner_relation: env::var("SUPABASE_OWNER_RELATION")
                .unwrap_or_else(|_| "students!collections_owner_id_fkey".to_string()),

            // Gating
            auth_mode,
            api_key,
            rate_limit,

            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000)?,
        })
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}
