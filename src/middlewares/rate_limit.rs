//! Per-caller request budget.
//!
//! A keyed GCRA limiter from `governor`: each caller may spend
//! `max_requests` within `window_secs`, refilled evenly across the window.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota,
};

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

pub struct RateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl RateLimiter {
    /// `None` when rate limiting is disabled or the budget is unusable
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let burst = NonZeroU32::new(config.max_requests)?;
        let period = Duration::from_secs(config.window_secs) / config.max_requests;
        let quota = Quota::with_period(period)?.allow_burst(burst);

        Some(Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        })
    }

    pub fn check(&self, key: &str) -> Result<(), AppError> {
        self.limiter.check_key(&key.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            AppError::RateLimited {
                retry_after_secs: wait.as_secs().max(1),
            }
        })
    }

    /// Drop state for callers whose budget is fully replenished
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}

/// Peer address if the server exposes it, else the first forwarded hop
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "anonymous".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(limiter) = &state.rate_limiter {
        let key = client_key(&request);
        if let Err(err) = limiter.check(&key) {
            tracing::warn!(client = %key, "Rate limit exceeded");
            return Err(err);
        }
    }

    Ok(next.run(request).await)
}
