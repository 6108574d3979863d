//! Status lookup by asking a peer chat bot.
//!
//! The peer bot answers `/user <name>` with an embed describing the
//! player. [`PeerBotQuery`] posts the command through a [`ChatGateway`],
//! then waits on the gateway's message feed for a reply authored by the
//! peer whose title (or, for untitled replies, body) names the queried
//! player.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clanwatch_core::parser;
use clanwatch_core::rank::Rank;
use clanwatch_core::roster::PlayerStatus;
use regex::Regex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::source::{Lookup, SourceError, SourceKind, StatusSource};

/// Default time to wait for the peer's reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(20);

/// An incoming chat message, flattened to what the lookup needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerMessage {
    pub author_id: u64,
    /// Title of the first embed, if any.
    pub title: Option<String>,
    /// Message content followed by embed description and fields, one
    /// `name\nvalue` pair per field.
    pub body: String,
}

impl PeerMessage {
    /// Whether this message is the peer's answer about `username`.
    ///
    /// The embed title decides when there is one; the body is only
    /// consulted for untitled replies, since every reply body carries
    /// field labels like "Online" and "Rank".
    pub fn is_reply_about(&self, peer_id: u64, username: &str) -> bool {
        if self.author_id != peer_id {
            return false;
        }
        let text = self.title.as_deref().unwrap_or(&self.body);
        names_player(text, username)
    }
}

/// Whether `text` contains `username` as a whole token, ignoring case.
/// Punctuation inside the name is literal, so `K.O` matches "Player: K.O"
/// but not "K.Ooze".
fn names_player(text: &str, username: &str) -> bool {
    if username.is_empty() {
        return false;
    }
    let pattern = format!(r"(?i)(?:^|[^\w]){}(?:[^\w]|$)", regex::escape(username));
    Regex::new(&pattern).is_ok_and(|re| re.is_match(text))
}

/// The slice of the chat platform the peer lookup depends on.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Channels the bot may post into, in preference order.
    async fn lookup_channels(&self) -> Result<Vec<u64>, SourceError>;

    /// Post `content` into `channel_id`.
    async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), SourceError>;

    /// Feed of every message the bot can see from now on.
    fn subscribe(&self) -> broadcast::Receiver<PeerMessage>;
}

/// Asks the configured peer bot for a player's status.
pub struct PeerBotQuery {
    gateway: Option<Arc<dyn ChatGateway>>,
    peer_id: Option<u64>,
    reply_timeout: Duration,
}

impl PeerBotQuery {
    /// Without a peer identity the query is disabled and always reports
    /// [`Lookup::Unavailable`] without touching the gateway.
    pub fn new(
        gateway: Option<Arc<dyn ChatGateway>>,
        peer_id: Option<u64>,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            peer_id,
            reply_timeout,
        }
    }

    /// A query that never performs I/O.
    pub fn disabled() -> Self {
        Self::new(None, None, DEFAULT_REPLY_TIMEOUT)
    }

    pub fn is_enabled(&self) -> bool {
        self.gateway.is_some() && self.peer_id.is_some()
    }
}

/// Build a status from a reply. Ranks default to Recruit when the reply
/// names none.
pub fn status_from_reply(username: &str, reply: &PeerMessage) -> PlayerStatus {
    let text = match &reply.title {
        Some(title) => format!("{title}\n{}", reply.body),
        None => reply.body.clone(),
    };
    let parsed = parser::parse(&text, Rank::Recruit);
    PlayerStatus::new(username, parsed.rank, parsed.is_online, parsed.experience)
}

/// Receive until the peer's reply about `username` arrives. `None` when
/// the feed closes.
async fn wait_for_reply(
    rx: &mut broadcast::Receiver<PeerMessage>,
    peer_id: u64,
    username: &str,
) -> Option<PeerMessage> {
    loop {
        match rx.recv().await {
            Ok(msg) if msg.is_reply_about(peer_id, username) => return Some(msg),
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Peer reply feed lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

#[async_trait]
impl StatusSource for PeerBotQuery {
    fn kind(&self) -> SourceKind {
        SourceKind::PeerBot
    }

    async fn fetch_status(&self, username: &str) -> Result<Lookup, SourceError> {
        let (Some(gateway), Some(peer_id)) = (self.gateway.as_ref(), self.peer_id) else {
            return Ok(Lookup::Unavailable);
        };

        let channels = gateway.lookup_channels().await?;

        // Subscribe before sending so a fast reply cannot be missed.
        let mut rx = gateway.subscribe();
        let command = format!("/user {username}");

        let mut sent_to = None;
        for channel_id in channels {
            match gateway.send_message(channel_id, &command).await {
                Ok(()) => {
                    sent_to = Some(channel_id);
                    break;
                }
                Err(e) => {
                    tracing::debug!(channel_id, error = %e, "Channel rejected lookup command");
                }
            }
        }

        let Some(channel_id) = sent_to else {
            tracing::debug!(username, "No channel accepted the peer lookup");
            return Ok(Lookup::Unavailable);
        };

        match tokio::time::timeout(self.reply_timeout, wait_for_reply(&mut rx, peer_id, username))
            .await
        {
            Ok(Some(reply)) => {
                let status = status_from_reply(username, &reply);
                tracing::debug!(
                    username,
                    channel_id,
                    rank = %status.rank,
                    is_online = status.is_online,
                    "Peer bot replied",
                );
                Ok(Lookup::Found(status))
            }
            Ok(None) => Ok(Lookup::Unavailable),
            Err(_) => {
                tracing::debug!(
                    username,
                    timeout_secs = self.reply_timeout.as_secs(),
                    "Peer bot did not reply in time",
                );
                Ok(Lookup::Unavailable)
            }
        }
    }
}
