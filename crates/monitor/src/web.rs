//! Status lookup by scraping community statistics sites.
//!
//! Endpoints are URL templates with a `{username}` placeholder, tried in
//! order. A page is only used if it plausibly describes the player and
//! carries a rank signal; everything else moves on to the next endpoint.
//! This is deliberately narrow and best-effort: site layouts change
//! without notice and the chain has further fallbacks.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use clanwatch_core::parser;
use clanwatch_core::rank::Rank;
use clanwatch_core::roster::PlayerStatus;
use regex::Regex;
use reqwest::header::USER_AGENT;
use reqwest::Url;

use crate::source::{Lookup, SourceError, SourceKind, StatusSource};

/// Placeholder substituted with the username.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like agent string; several stats sites reject unknown agents.
const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Sites queried when no endpoints are configured.
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://protanki.eu/en/player/{username}",
    "https://protanki.tv/en/player/{username}",
    "https://protanki-stats.com/search?player={username}",
    "https://tank-stats.eu/search?player={username}",
];

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").expect("valid regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static PROFILE_CONTAINER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\b[^>]*\bclass\s*=\s*["'][^"']*(?:player|profile)"#)
        .expect("valid regex")
});

static RANK_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*\bclass\s*=\s*["'][^"']*(?:rank|level)"#).expect("valid regex")
});

/// Scrapes player pages from a list of endpoint templates.
pub struct WebLookup {
    client: reqwest::Client,
    endpoints: Vec<String>,
    request_timeout: Duration,
}

impl WebLookup {
    pub fn new(endpoints: Vec<String>, request_timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints, request_timeout)
    }

    /// Create a lookup reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        endpoints: Vec<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoints,
            request_timeout,
        }
    }
}

#[async_trait]
impl StatusSource for WebLookup {
    fn kind(&self) -> SourceKind {
        SourceKind::Web
    }

    async fn fetch_status(&self, username: &str) -> Result<Lookup, SourceError> {
        let mut last_transport_error = None;
        let mut any_response = false;

        for template in &self.endpoints {
            let Some(url) = render_endpoint(template, username) else {
                tracing::warn!(template = %template, "Invalid stats endpoint template");
                continue;
            };

            let response = match self
                .client
                .get(url.clone())
                .header(USER_AGENT, BROWSER_AGENT)
                .timeout(self.request_timeout)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Stats site request failed");
                    last_transport_error = Some(e);
                    continue;
                }
            };
            any_response = true;

            let status = response.status();
            if !status.is_success() {
                tracing::debug!(
                    url = %url,
                    status = status.as_u16(),
                    "Stats site returned non-success",
                );
                continue;
            }

            let html = match response.text().await {
                Ok(html) => html,
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Failed to read stats page body");
                    continue;
                }
            };

            if let Some(found) = extract_status(&html, username) {
                tracing::debug!(
                    url = %url,
                    username,
                    rank = %found.rank,
                    "Player found on stats site",
                );
                return Ok(Lookup::Found(found));
            }
        }

        match last_transport_error {
            Some(e) if !any_response => Err(SourceError::Http(e)),
            _ => Ok(Lookup::Unavailable),
        }
    }
}

/// Stand-in for the placeholder while the template is parsed. Made of
/// unreserved characters so it survives parsing unchanged.
const USERNAME_SLOT: &str = "__clanwatch_username__";

/// Build the request URL for `username` from an endpoint template. The
/// placeholder may be a whole path segment or a query value; [`Url`]
/// does the encoding. `None` when the template is not a valid URL.
pub fn render_endpoint(template: &str, username: &str) -> Option<Url> {
    let parsed = Url::parse(&template.replace(USERNAME_PLACEHOLDER, USERNAME_SLOT)).ok()?;
    let mut url = parsed.clone();

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();
    if segments.contains(&USERNAME_SLOT) {
        url.path_segments_mut()
            .ok()?
            .clear()
            .extend(segments.iter().map(|s| if *s == USERNAME_SLOT { username } else { *s }));
    }

    let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    if pairs.iter().any(|(_, value)| value == USERNAME_SLOT) {
        url.query_pairs_mut().clear().extend_pairs(pairs.iter().map(|(key, value)| {
            let value = if value == USERNAME_SLOT { username } else { value.as_str() };
            (key.as_str(), value)
        }));
    }

    Some(url)
}

/// Visible text of an HTML page with whitespace collapsed to single
/// spaces and the common entities decoded.
pub fn page_text(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE_RE.replace_all(html, " ");
    let without_tags = TAG_RE.replace_all(&without_scripts, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Whether a page plausibly concerns `username`: the name appears in the
/// text, or the markup has a player/profile container or a rank/level
/// marker.
pub fn is_player_page(html: &str, text: &str, username: &str) -> bool {
    text.to_lowercase().contains(&username.to_lowercase())
        || PROFILE_CONTAINER_RE.is_match(html)
        || RANK_MARKER_RE.is_match(html)
}

/// Extract a status from a page, or `None` when the page is not about
/// the player or names no rank.
pub fn extract_status(html: &str, username: &str) -> Option<PlayerStatus> {
    let text = page_text(html);
    if !is_player_page(html, &text, username) {
        return None;
    }
    let parsed = parser::parse(&text, Rank::Unknown);
    if !parsed.has_rank_signal() {
        return None;
    }
    Some(PlayerStatus::new(
        username,
        parsed.rank,
        parsed.is_online,
        parsed.experience,
    ))
}
