//! API-key gate and fixed-window rate limiting for the `/api` tree.
//!
//! The key arrives in the `X-API-Key` header or the `api_key` query
//! parameter. A missing key only fails when `require_api_key` is set; a key
//! that is present but unknown is always rejected. The limiter keeps one
//! counter per client address (first `X-Forwarded-For` hop, else the peer
//! address) and resets it when the window expires.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;

use impulsa_common::error::ApiError;
use impulsa_config::{AuthConfig, RateLimitConfig};

use crate::state::SharedState;

/// Above this many tracked clients, expired windows are swept on the next hit.
const CLEANUP_WATERMARK: usize = 1024;

#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client address.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Registers one hit for `key`. `Err` carries the seconds left in the
    /// current window.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        if !self.config.enabled {
            return Ok(());
        }

        if self.windows.len() > CLEANUP_WATERMARK {
            self.windows.retain(|_, window| now < window.reset_at);
        }

        let window_len = Duration::from_secs(self.config.window_secs);
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                count: 0,
                reset_at: now + window_len,
            });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window_len;
        }

        if entry.count >= self.config.max_requests {
            return Err(secs_until(entry.reset_at, now));
        }

        entry.count += 1;
        Ok(())
    }
}

fn secs_until(reset_at: Instant, now: Instant) -> u64 {
    let remaining = reset_at.saturating_duration_since(now);
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    secs.max(1)
}

/// Middleware for everything under `/api`: key check first, then the limiter.
pub async fn api_gate(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = api_key_from(&request);
    check_api_key(provided.as_deref(), &state.config.auth)?;

    let client = client_key(&request);
    state.limiter.check(&client).map_err(|retry_after_secs| {
        tracing::warn!(client = %client, "rate limit exceeded");
        ApiError::RateLimited { retry_after_secs }
    })?;

    Ok(next.run(request).await)
}

fn check_api_key(provided: Option<&str>, auth: &AuthConfig) -> Result<(), ApiError> {
    match provided {
        None if auth.require_api_key => {
            Err(ApiError::Unauthorized("API key required".to_string()))
        }
        None => Ok(()),
        Some(key) if auth.api_keys.iter().any(|known| known == key) => Ok(()),
        Some(_) => Err(ApiError::Forbidden("Invalid API key".to_string())),
    }
}

fn api_key_from(request: &Request) -> Option<String> {
    if let Some(value) = request.headers().get("x-api-key") {
        if let Ok(value) = value.to_str() {
            return Some(value.to_string());
        }
    }
    request
        .uri()
        .query()
        .and_then(|query| query_param(query, "api_key"))
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(client) = forwarded_client(value) {
                return client;
            }
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// First hop of an `X-Forwarded-For` chain.
pub(crate) fn forwarded_client(value: &str) -> Option<String> {
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(require: bool, keys: &[&str]) -> AuthConfig {
        AuthConfig {
            require_api_key: require,
            api_keys: keys.iter().map(|key| key.to_string()).collect(),
        }
    }

    #[test]
    fn missing_key_passes_unless_required() {
        assert!(check_api_key(None, &auth(false, &["k1"])).is_ok());
        assert!(matches!(
            check_api_key(None, &auth(true, &["k1"])),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn known_key_passes_in_both_modes() {
        assert!(check_api_key(Some("k1"), &auth(false, &["k1", "k2"])).is_ok());
        assert!(check_api_key(Some("k2"), &auth(true, &["k1", "k2"])).is_ok());
    }

    #[test]
    fn unknown_key_is_rejected_even_when_optional() {
        assert!(matches!(
            check_api_key(Some("nope"), &auth(false, &["k1"])),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            check_api_key(Some("nope"), &auth(true, &["k1"])),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn query_param_finds_api_key() {
        assert_eq!(
            query_param("format=csv&api_key=secret", "api_key"),
            Some("secret".to_string())
        );
        assert_eq!(query_param("api_key=", "api_key"), None);
        assert_eq!(query_param("other=1", "api_key"), None);
    }

    #[test]
    fn forwarded_client_takes_first_hop() {
        assert_eq!(
            forwarded_client("203.0.113.9, 10.0.0.1"),
            Some("203.0.113.9".to_string())
        );
        assert_eq!(forwarded_client("  "), None);
    }

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn limiter_allows_until_window_is_full() {
        let limiter = limiter(2, 60);
        let now = Instant::now();
        assert!(limiter.check_at("1.2.3.4", now).is_ok());
        assert!(limiter.check_at("1.2.3.4", now).is_ok());
        let retry = limiter.check_at("1.2.3.4", now).unwrap_err();
        assert!(retry >= 1 && retry <= 60);
        // Other clients keep their own window.
        assert!(limiter.check_at("5.6.7.8", now).is_ok());
    }

    #[test]
    fn limiter_resets_after_the_window() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check_at("1.2.3.4", now).is_ok());
        assert!(limiter.check_at("1.2.3.4", now).is_err());
        let later = now + Duration::from_secs(61);
        assert!(limiter.check_at("1.2.3.4", later).is_ok());
    }

    #[test]
    fn disabled_limiter_passes_everything() {
        let limiter = RateLimiter::new(RateLimitConfig {
            enabled: false,
            max_requests: 0,
            window_secs: 60,
        });
        for _ in 0..10 {
            assert!(limiter.check("1.2.3.4").is_ok());
        }
    }
}
