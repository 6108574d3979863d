//! Ordered fallback over status sources.

use std::sync::Arc;

use clanwatch_core::roster::PlayerStatus;

use crate::overrides::identity_override;
use crate::peer::PeerBotQuery;
use crate::source::{Lookup, SourceKind, StatusSource};
use crate::synthetic::SyntheticFallback;
use crate::web::WebLookup;

/// A status together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub status: PlayerStatus,
    pub source: SourceKind,
}

/// Tries identity overrides, then each source in order, and finally the
/// synthetic fallback. Resolution always produces a status.
pub struct StrategyChain {
    sources: Vec<Arc<dyn StatusSource>>,
    fallback: SyntheticFallback,
}

impl StrategyChain {
    pub fn new(sources: Vec<Arc<dyn StatusSource>>) -> Self {
        Self {
            sources,
            fallback: SyntheticFallback::new(),
        }
    }

    /// The production order: peer bot query, then stats sites.
    pub fn standard(peer: PeerBotQuery, web: WebLookup) -> Self {
        let peer: Arc<dyn StatusSource> = Arc::new(peer);
        let web: Arc<dyn StatusSource> = Arc::new(web);
        Self::new(vec![peer, web])
    }

    /// Resolve `username` to a status. Source failures are logged and
    /// treated as unavailable.
    pub async fn resolve(&self, username: &str) -> Resolved {
        if let Some(status) = identity_override(username) {
            return Resolved {
                status,
                source: SourceKind::Override,
            };
        }

        for source in &self.sources {
            match source.fetch_status(username).await {
                Ok(Lookup::Found(status)) => {
                    return Resolved {
                        status,
                        source: source.kind(),
                    };
                }
                Ok(Lookup::Unavailable) => {
                    tracing::debug!(
                        username,
                        source = source.kind().as_str(),
                        "Source had no status",
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        username,
                        source = source.kind().as_str(),
                        error = %e,
                        "Status source failed",
                    );
                }
            }
        }

        Resolved {
            status: self.fallback.generate(username),
            source: SourceKind::Synthetic,
        }
    }
}
