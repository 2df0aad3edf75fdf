//! Shared application state for the web server.

use std::sync::Arc;

use impulsa_config::Config;
use sqlx::PgPool;

use crate::auth::RateLimiter;

/// Shared state injected into every axum handler. Repositories are cheap
/// wrappers over the pool, so handlers construct them on demand.
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config, db: PgPool) -> Self {
        let limiter = RateLimiter::new(config.rate_limit.clone());
        Self {
            config,
            db,
            limiter,
        }
    }
}

pub type SharedState = Arc<AppState>;
