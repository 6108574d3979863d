//! Discord transport.
//!
//! [`Handler`] receives gateway events: every message is relayed onto the
//! peer feed, commands are answered with embeds, and monitoring starts
//! once the session is ready. [`SerenityGateway`] is the [`ChatGateway`]
//! the peer bot lookup posts through.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use clanwatch_monitor::engine::MonitoringEngine;
use clanwatch_monitor::peer::{ChatGateway, PeerMessage};
use clanwatch_monitor::source::SourceError;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::cache::Cache;
use serenity::client::{Context, EventHandler};
use serenity::gateway::ActivityData;
use serenity::http::Http;
use serenity::model::channel::{ChannelType, Message};
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::model::Timestamp;
use tokio::sync::broadcast;

use crate::commands::Commands;
use crate::health::BotStatus;
use crate::reply::Reply;

/// Buffered messages per peer feed subscriber.
const FEED_CAPACITY: usize = 256;

/// Embed colour for successful commands and clan reports.
pub const SUCCESS_COLOUR: u32 = 0x00ff00;
/// Embed colour for rejected or failed commands.
pub const FAILURE_COLOUR: u32 = 0xff0000;
/// Embed colour for listings and help.
pub const INFO_COLOUR: u32 = 0x0099ff;

/// Footer shown under clan reports, next to the embed timestamp.
const REPORT_FOOTER: &str = "Last updated";

/// Lay a command reply out as an embed stamped with `timestamp`.
pub fn render_embed(reply: &Reply, timestamp: Timestamp) -> CreateEmbed {
    let embed = CreateEmbed::new().timestamp(timestamp);
    match reply {
        Reply::Success { title, description } => embed
            .title(format!("✅ {title}"))
            .description(description)
            .colour(SUCCESS_COLOUR),
        Reply::Failure { title, description } => embed
            .title(format!("❌ {title}"))
            .description(description)
            .colour(FAILURE_COLOUR),
        Reply::Info { title, description } => embed
            .title(title)
            .description(description)
            .colour(INFO_COLOUR),
        Reply::Clan(report) => report.fields().into_iter().fold(
            embed
                .title(report.title())
                .colour(SUCCESS_COLOUR)
                .footer(CreateEmbedFooter::new(REPORT_FOOTER)),
            |embed, field| embed.field(field.name, field.value, field.inline),
        ),
    }
}

/// Text of one embed, borrowed from a gateway message.
#[derive(Debug, Default)]
pub struct EmbedText<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub fields: Vec<(&'a str, &'a str)>,
}

/// Flatten message content and embeds into a [`PeerMessage`]. The title
/// is the first embed title; the body is the content followed by each
/// embed's description and `name\nvalue` fields, one per line.
pub fn flatten_message(author_id: u64, content: &str, embeds: &[EmbedText<'_>]) -> PeerMessage {
    let mut lines: Vec<&str> = Vec::new();
    if !content.is_empty() {
        lines.push(content);
    }
    for embed in embeds {
        lines.extend(embed.description);
        for (name, value) in &embed.fields {
            lines.push(name);
            lines.push(value);
        }
    }

    PeerMessage {
        author_id,
        title: embeds.iter().find_map(|e| e.title).map(str::to_string),
        body: lines.join("\n"),
    }
}

fn to_peer_message(msg: &Message) -> PeerMessage {
    let embeds: Vec<EmbedText<'_>> = msg
        .embeds
        .iter()
        .map(|embed| EmbedText {
            title: embed.title.as_deref(),
            description: embed.description.as_deref(),
            fields: embed
                .fields
                .iter()
                .map(|f| (f.name.as_str(), f.value.as_str()))
                .collect(),
        })
        .collect();
    flatten_message(msg.author.id.get(), &msg.content, &embeds)
}

/// Gateway event handler.
pub struct Handler {
    commands: Arc<Commands>,
    engine: Arc<MonitoringEngine>,
    status: Arc<BotStatus>,
    feed: broadcast::Sender<PeerMessage>,
}

impl Handler {
    pub fn new(
        commands: Arc<Commands>,
        engine: Arc<MonitoringEngine>,
        status: Arc<BotStatus>,
        feed: broadcast::Sender<PeerMessage>,
    ) -> Self {
        Self {
            commands,
            engine,
            status,
            feed,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        // No subscribers is the normal case outside a peer lookup.
        let _ = self.feed.send(to_peer_message(&msg));

        if msg.author.bot {
            return;
        }

        let Some(reply) = self.commands.handle(msg.author.id.get(), &msg.content).await else {
            return;
        };
        let message = CreateMessage::new().embed(render_embed(&reply, Timestamp::now()));
        if let Err(e) = msg.channel_id.send_message(&ctx.http, message).await {
            tracing::warn!(
                channel_id = msg.channel_id.get(),
                error = %e,
                "Failed to send command reply",
            );
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to Discord",
        );
        self.status.set_connected(ready.guilds.len());
        ctx.set_activity(Some(ActivityData::watching("clan members")));

        if self.commands.owner_id().is_none() {
            match ctx.http.get_current_application_info().await {
                Ok(info) => {
                    if let Some(owner) = info.owner {
                        self.commands.set_owner(owner.id.get());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to resolve application owner");
                }
            }
        }

        self.engine.start().await;
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        tracing::info!("Gateway session resumed");
    }
}

/// [`ChatGateway`] over the Discord REST API, the client's guild cache,
/// and the handler's message feed.
pub struct SerenityGateway {
    http: Arc<Http>,
    cache: OnceLock<Arc<Cache>>,
    feed: broadcast::Sender<PeerMessage>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>) -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            http,
            cache: OnceLock::new(),
            feed,
        }
    }

    /// Sender the event handler publishes incoming messages on.
    pub fn feed(&self) -> broadcast::Sender<PeerMessage> {
        self.feed.clone()
    }

    /// Read channels from the client's cache. Only the first cache
    /// attached is kept.
    pub fn attach_cache(&self, cache: Arc<Cache>) {
        let _ = self.cache.set(cache);
    }
}

/// Text channels of every cached guild, guilds in id order and each
/// guild's channels in sidebar order.
fn cached_text_channels(cache: &Cache) -> Vec<u64> {
    let mut guild_ids = cache.guilds();
    guild_ids.sort();

    let mut ids = Vec::new();
    for guild_id in guild_ids {
        let Some(guild) = cache.guild(guild_id) else {
            continue;
        };
        let mut text: Vec<(u16, u64)> = guild
            .channels
            .values()
            .filter(|c| c.kind == ChannelType::Text)
            .map(|c| (c.position, c.id.get()))
            .collect();
        text.sort_unstable();
        ids.extend(text.into_iter().map(|(_, id)| id));
    }
    ids
}

fn gateway_error(err: serenity::Error) -> SourceError {
    SourceError::Gateway(err.to_string())
}

#[async_trait]
impl ChatGateway for SerenityGateway {
    async fn lookup_channels(&self) -> Result<Vec<u64>, SourceError> {
        let cache = self
            .cache
            .get()
            .ok_or_else(|| SourceError::Gateway("guild cache not attached".into()))?;
        Ok(cached_text_channels(cache))
    }

    async fn send_message(&self, channel_id: u64, content: &str) -> Result<(), SourceError> {
        ChannelId::new(channel_id)
            .say(&self.http, content)
            .await
            .map(|_| ())
            .map_err(gateway_error)
    }

    fn subscribe(&self) -> broadcast::Receiver<PeerMessage> {
        self.feed.subscribe()
    }
}
