#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use clanwatch_core::rank::Rank;
use clanwatch_core::roster::{Clan, Member, PlayerStatus, RosterStore, StoreError};
use clanwatch_core::types::DbId;
use clanwatch_db::MemoryRosterStore;
use clanwatch_monitor::config::MonitorConfig;
use clanwatch_monitor::peer::{ChatGateway, PeerMessage};
use clanwatch_monitor::source::{Lookup, SourceError, SourceKind, StatusSource};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Production cadence (60s interval, 2s pacing, 30s backoff) with a short
/// stop timeout. Suited to paused-clock tests.
pub fn paused_config() -> MonitorConfig {
    MonitorConfig {
        stop_timeout: Duration::from_secs(1),
        web_endpoints: Vec::new(),
        ..MonitorConfig::default()
    }
}

/// Millisecond timings for tests that run against a real socket.
pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        check_interval: Duration::from_millis(200),
        request_pacing: Duration::from_millis(10),
        error_backoff: Duration::from_millis(100),
        peer_reply_timeout: Duration::from_millis(100),
        web_request_timeout: Duration::from_secs(2),
        stop_timeout: Duration::from_secs(1),
        web_endpoints: Vec::new(),
        peer_bot_id: None,
    }
}

// ---------------------------------------------------------------------------
// Roster store
// ---------------------------------------------------------------------------

/// In-memory store that records every status write and can be told to
/// fail roster listings.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryRosterStore,
    writes: Mutex<Vec<(String, Rank, bool)>>,
    fail_listing: AtomicBool,
}

impl RecordingStore {
    /// A store holding one clan with the given members.
    pub async fn with_members(usernames: &[&str]) -> Arc<Self> {
        let store = Arc::new(Self::default());
        let clan = store.inner.add_clan("Wolves").await.unwrap();
        for username in usernames {
            store.inner.add_member(username, clan.id).await.unwrap();
        }
        store
    }

    pub fn writes(&self) -> Vec<(String, Rank, bool)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn writes_for(&self, username: &str) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _, _)| name == username)
            .count()
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub async fn member(&self, username: &str) -> Option<Member> {
        self.inner
            .list_members()
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.username == username)
    }
}

#[async_trait]
impl RosterStore for RecordingStore {
    async fn add_clan(&self, name: &str) -> Result<Clan, StoreError> {
        self.inner.add_clan(name).await
    }

    async fn list_clans(&self) -> Result<Vec<Clan>, StoreError> {
        self.inner.list_clans().await
    }

    async fn find_clan_by_name(&self, name: &str) -> Result<Option<Clan>, StoreError> {
        self.inner.find_clan_by_name(name).await
    }

    async fn remove_clan(&self, name: &str) -> Result<bool, StoreError> {
        self.inner.remove_clan(name).await
    }

    async fn add_member(&self, username: &str, clan_id: DbId) -> Result<Member, StoreError> {
        self.inner.add_member(username, clan_id).await
    }

    async fn remove_member(&self, username: &str) -> Result<Option<String>, StoreError> {
        self.inner.remove_member(username).await
    }

    async fn clan_members(&self, clan_id: DbId) -> Result<Vec<Member>, StoreError> {
        self.inner.clan_members(clan_id).await
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("listing disabled".into()));
        }
        self.inner.list_members().await
    }

    async fn update_status(
        &self,
        username: &str,
        rank: Rank,
        is_online: bool,
    ) -> Result<bool, StoreError> {
        let updated = self.inner.update_status(username, rank, is_online).await?;
        if updated {
            self.writes
                .lock()
                .unwrap()
                .push((username.to_string(), rank, is_online));
        }
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Status sources
// ---------------------------------------------------------------------------

/// What a [`ScriptedSource`] answers for a username.
#[derive(Debug, Clone, Copy)]
pub enum Answer {
    Found(Rank, bool),
    Unavailable,
    Fail,
    Panic,
}

/// A source with canned answers that counts its calls.
pub struct ScriptedSource {
    kind: SourceKind,
    default: Answer,
    answers: HashMap<String, Answer>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new(kind: SourceKind, default: Answer) -> Self {
        Self {
            kind,
            default,
            answers: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, username: &str, answer: Answer) -> Self {
        self.answers.insert(username.to_string(), answer);
        self
    }

    pub fn calls_for(&self, username: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|name| *name == username)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch_status(&self, username: &str) -> Result<Lookup, SourceError> {
        self.calls.lock().unwrap().push(username.to_string());
        match self.answers.get(username).copied().unwrap_or(self.default) {
            Answer::Found(rank, online) => {
                Ok(Lookup::Found(PlayerStatus::new(username, rank, online, None)))
            }
            Answer::Unavailable => Ok(Lookup::Unavailable),
            Answer::Fail => Err(SourceError::Gateway("scripted failure".into())),
            Answer::Panic => panic!("scripted panic for {username}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat gateway
// ---------------------------------------------------------------------------

/// Gateway double. Records sent commands and, on a successful send,
/// publishes the configured reply on the message feed.
pub struct FakeGateway {
    channels: Vec<u64>,
    rejecting: Vec<u64>,
    reply: Mutex<Option<PeerMessage>>,
    sent: Mutex<Vec<(u64, String)>>,
    feed: broadcast::Sender<PeerMessage>,
}

impl FakeGateway {
    pub fn new(channels: Vec<u64>) -> Self {
        let (feed, _) = broadcast::channel(16);
        Self {
            channels,
            rejecting: Vec::new(),
            reply: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            feed,
        }
    }

    pub fn rejecting(mut self, channel_id: u64) -> Self {
        self.rejecting.push(channel_id);
        self
    }

    pub fn replying_with(self, reply: PeerMessage) -> Self {
        *self.reply.lock().unwrap() = Some(reply);
        self
    }

    pub fn sent(&self) -> Vec<(u64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn lookup_channels(&self) -> Result<Vec<u64>, SourceError> {
        Ok(self.channels.clone())
    }

    async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), SourceError> {
        if self.rejecting.contains(&channel_id) {
            return Err(SourceError::Gateway("missing permissions".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id, content.to_string()));
        let reply = self.reply.lock().unwrap().clone();
        if let Some(reply) = reply {
            let _ = self.feed.send(reply);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PeerMessage> {
        self.feed.subscribe()
    }
}

pub fn peer_message(author_id: u64, title: &str, body: &str) -> PeerMessage {
    PeerMessage {
        author_id,
        title: Some(title.to_string()),
        body: body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Serve `app` on an ephemeral localhost port and return its address.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Poll `check` every 20ms until it holds or `limit` elapses.
pub async fn wait_until<F, Fut>(limit: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check().await
}
