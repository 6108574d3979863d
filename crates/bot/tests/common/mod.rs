#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use clanwatch_bot::commands::Commands;
use clanwatch_bot::reply::Reply;
use clanwatch_core::roster::RosterStore;
use clanwatch_db::MemoryRosterStore;
use clanwatch_monitor::chain::StrategyChain;
use clanwatch_monitor::config::MonitorConfig;
use clanwatch_monitor::engine::MonitoringEngine;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const OWNER: u64 = 1;
pub const MEMBER: u64 = 2;

/// Commands over an empty in-memory roster. The engine has no upstream
/// sources, so every check resolves through overrides or synthetic data.
pub fn test_commands() -> (Commands, Arc<MemoryRosterStore>) {
    let store = Arc::new(MemoryRosterStore::new());
    let roster: Arc<dyn RosterStore> = store.clone();
    let config = MonitorConfig {
        stop_timeout: Duration::from_secs(1),
        web_endpoints: Vec::new(),
        ..MonitorConfig::default()
    };
    let engine = Arc::new(MonitoringEngine::new(
        Arc::clone(&roster),
        StrategyChain::new(Vec::new()),
        config,
    ));
    (Commands::new(roster, engine, Some(OWNER)), store)
}

/// Run a message through the command layer and return the reply.
pub async fn reply(commands: &Commands, author: u64, content: &str) -> Reply {
    commands
        .handle(author, content)
        .await
        .unwrap_or_else(|| panic!("no reply for {content:?}"))
}

/// Description of a success reply, failing the test on any other kind.
pub fn success_text(reply: Reply) -> String {
    match reply {
        Reply::Success { description, .. } => description,
        other => panic!("expected success, got {other:?}"),
    }
}

/// Description of an info reply, failing the test on any other kind.
pub fn info_text(reply: Reply) -> String {
    match reply {
        Reply::Info { description, .. } => description,
        other => panic!("expected info, got {other:?}"),
    }
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body as a UTF-8 string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
