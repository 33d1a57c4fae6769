use axum::{routing::get, Router};
use chrono::Datelike;
use std::sync::Arc;

use crate::stats::StatsService;

pub mod health;
pub mod stats;

/// Source of "now" for defaulting the season.
pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Wall clock in the server's local time zone.
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        chrono::Local::now().year()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StatsService>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(stats: StatsService) -> Self {
        Self::with_clock(stats, Arc::new(SystemClock))
    }

    pub fn with_clock(stats: StatsService, clock: Arc<dyn Clock>) -> Self {
        Self {
            stats: Arc::new(stats),
            clock,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/stats", get(stats::get_stats))
        .with_state(state)
}
