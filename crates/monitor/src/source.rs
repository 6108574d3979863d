//! The capability shared by every status lookup strategy.

use async_trait::async_trait;
use clanwatch_core::roster::PlayerStatus;

/// Which tier of the strategy chain produced a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Override,
    PeerBot,
    Web,
    Synthetic,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Override => "override",
            SourceKind::PeerBot => "peer_bot",
            SourceKind::Web => "web",
            SourceKind::Synthetic => "synthetic",
        }
    }
}

/// Outcome of a lookup that did not hit a transport failure.
///
/// `Unavailable` is a normal answer ("this source has nothing for that
/// player right now") and sends the chain on to the next tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(PlayerStatus),
    Unavailable,
}

/// Hard failures inside a strategy. The chain treats every variant the
/// same as [`Lookup::Unavailable`]; they exist so logs say what broke.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat gateway refused or failed an operation.
    #[error("Chat gateway error: {0}")]
    Gateway(String),
}

/// A way of fetching the current status of a player by username.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Tier reported in logs and check outcomes.
    fn kind(&self) -> SourceKind;

    /// Look up `username`. Not finding the player is `Ok(Lookup::Unavailable)`.
    async fn fetch_status(&self, username: &str) -> Result<Lookup, SourceError>;
}
