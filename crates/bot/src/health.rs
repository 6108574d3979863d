//! Liveness endpoints for the hosting platform.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

/// Gateway connection state shared between the Discord handler and the
/// HTTP endpoints.
#[derive(Debug, Default)]
pub struct BotStatus {
    connected: AtomicBool,
    guild_count: AtomicUsize,
}

impl BotStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, guild_count: usize) {
        self.guild_count.store(guild_count, Ordering::Relaxed);
        self.connected.store(true, Ordering::Relaxed);
    }

    pub fn set_disconnected(&self) {
        self.connected.store(false, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn guild_count(&self) -> usize {
        self.guild_count.load(Ordering::Relaxed)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    bot_status: &'static str,
    guilds: usize,
    version: &'static str,
}

async fn index() -> &'static str {
    "Clanwatch bot is running"
}

async fn health_check(State(status): State<Arc<BotStatus>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        bot_status: if status.is_connected() {
            "connected"
        } else {
            "disconnected"
        },
        guilds: status.guild_count(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ping() -> &'static str {
    "pong"
}

pub fn router(status: Arc<BotStatus>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/ping", get(ping))
        .with_state(status)
}
