use std::time::Duration;

use crate::peer::DEFAULT_REPLY_TIMEOUT;
use crate::web::{DEFAULT_ENDPOINTS, DEFAULT_REQUEST_TIMEOUT};

/// Monitoring loop configuration.
///
/// Defaults match production behaviour; tests shrink the intervals.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Minimum time between two checks of the same member (default: 60s).
    pub check_interval: Duration,
    /// Pause between consecutive member checks within a pass (default: 2s).
    pub request_pacing: Duration,
    /// Sleep after a pass fails before trying again (default: 30s).
    pub error_backoff: Duration,
    /// How long to wait for the peer bot's reply (default: 20s).
    pub peer_reply_timeout: Duration,
    /// Per-request timeout for stats site lookups (default: 10s).
    pub web_request_timeout: Duration,
    /// How long `stop` waits for the loop to wind down before aborting it
    /// (default: 5s).
    pub stop_timeout: Duration,
    /// Stats site URL templates containing `{username}`.
    pub web_endpoints: Vec<String>,
    /// Chat identity of the peer bot. `None` disables the peer query.
    pub peer_bot_id: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            request_pacing: Duration::from_secs(2),
            error_backoff: Duration::from_secs(30),
            peer_reply_timeout: DEFAULT_REPLY_TIMEOUT,
            web_request_timeout: DEFAULT_REQUEST_TIMEOUT,
            stop_timeout: Duration::from_secs(5),
            web_endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            peer_bot_id: None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `CHECK_INTERVAL_SECS`      | `60`                     |
    /// | `REQUEST_PACING_SECS`      | `2`                      |
    /// | `ERROR_BACKOFF_SECS`       | `30`                     |
    /// | `PEER_REPLY_TIMEOUT_SECS`  | `20`                     |
    /// | `WEB_REQUEST_TIMEOUT_SECS` | `10`                     |
    /// | `STATS_ENDPOINTS`          | built-in stats sites     |
    /// | `PEER_BOT_ID`              | unset (peer query off)   |
    ///
    /// `JEFFRIE_BOT_ID` is accepted as an alias for `PEER_BOT_ID`. An id of
    /// `0` disables the peer query. `STATS_ENDPOINTS` is comma-separated.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let web_endpoints = match std::env::var("STATS_ENDPOINTS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.web_endpoints,
        };

        let peer_bot_id = std::env::var("PEER_BOT_ID")
            .or_else(|_| std::env::var("JEFFRIE_BOT_ID"))
            .ok()
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .expect("PEER_BOT_ID must be a valid u64")
            })
            .filter(|id| *id != 0);

        Self {
            check_interval: secs_from_env("CHECK_INTERVAL_SECS", defaults.check_interval),
            request_pacing: secs_from_env("REQUEST_PACING_SECS", defaults.request_pacing),
            error_backoff: secs_from_env("ERROR_BACKOFF_SECS", defaults.error_backoff),
            peer_reply_timeout: secs_from_env(
                "PEER_REPLY_TIMEOUT_SECS",
                defaults.peer_reply_timeout,
            ),
            web_request_timeout: secs_from_env(
                "WEB_REQUEST_TIMEOUT_SECS",
                defaults.web_request_timeout,
            ),
            stop_timeout: defaults.stop_timeout,
            web_endpoints,
            peer_bot_id,
        }
    }
}

/// Read a whole number of seconds from `var`, or `default` when unset.
fn secs_from_env(var: &str, default: Duration) -> Duration {
    match std::env::var(var) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .unwrap_or_else(|_| panic!("{var} must be a valid u64"));
            Duration::from_secs(secs)
        }
        Err(_) => default,
    }
}
