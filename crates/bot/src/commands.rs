//! Text command parsing and execution.
//!
//! Commands start with `!`. Parsing and execution are independent of the
//! chat transport: [`Commands::handle`] takes the author and message text
//! and returns a [`Reply`], if any.

use std::sync::{Arc, OnceLock};

use clanwatch_core::error::CoreError;
use clanwatch_core::rank::Rank;
use clanwatch_core::report::{rank_icon, ClanReport};
use clanwatch_core::roster::{Clan, RosterStore, StoreError};
use clanwatch_monitor::engine::MonitoringEngine;

use crate::error::{BotError, BotResult};
use crate::reply::Reply;

/// Prefix that marks a message as a command.
pub const PREFIX: char = '!';

/// Accepted clan name length in characters.
pub const CLAN_NAME_LEN: (usize, usize) = (2, 50);

/// Accepted username length in characters.
pub const USERNAME_LEN: (usize, usize) = (2, 30);

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddClan(String),
    RemoveClan(String),
    Clans,
    AddMember { clan: String, username: String },
    RemoveMember(String),
    Clan(String),
    Help,
}

/// Parse a message. `None` when the message is not a known command.
///
/// Clan names extend to the end of the line, except in `!addmember`
/// where the clan is the first word and the username the rest.
pub fn parse(content: &str) -> Option<BotResult<Command>> {
    let body = content.trim().strip_prefix(PREFIX)?;
    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "addclan" => required(rest, "!addclan <name>").map(Command::AddClan),
        "removeclan" => required(rest, "!removeclan <name>").map(Command::RemoveClan),
        "clans" => Ok(Command::Clans),
        "addmember" => match rest.split_once(char::is_whitespace) {
            Some((clan, username)) if !username.trim().is_empty() => Ok(Command::AddMember {
                clan: clan.to_string(),
                username: username.trim().to_string(),
            }),
            _ => Err(usage("!addmember <clan> <username>")),
        },
        "removemember" => required(rest, "!removemember <username>").map(Command::RemoveMember),
        "clan" => required(rest, "!clan <name>").map(Command::Clan),
        "help" => Ok(Command::Help),
        _ => return None,
    };
    Some(command)
}

fn required(arg: &str, usage_line: &str) -> BotResult<String> {
    if arg.is_empty() {
        Err(usage(usage_line))
    } else {
        Ok(arg.to_string())
    }
}

fn usage(line: &str) -> BotError {
    CoreError::Validation(format!("Usage: `{line}`")).into()
}

fn check_length(value: &str, what: &str, (min, max): (usize, usize)) -> BotResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(CoreError::Validation(format!(
            "{what} must be between {min} and {max} characters!"
        ))
        .into());
    }
    Ok(())
}

/// Executes commands against the roster and the monitoring engine.
pub struct Commands {
    store: Arc<dyn RosterStore>,
    engine: Arc<MonitoringEngine>,
    owner_id: OnceLock<u64>,
}

impl Commands {
    pub fn new(
        store: Arc<dyn RosterStore>,
        engine: Arc<MonitoringEngine>,
        owner_id: Option<u64>,
    ) -> Self {
        let owner = OnceLock::new();
        if let Some(id) = owner_id {
            let _ = owner.set(id);
        }
        Self {
            store,
            engine,
            owner_id: owner,
        }
    }

    /// Record the owner discovered at startup. Ignored if one is already
    /// configured.
    pub fn set_owner(&self, owner_id: u64) {
        if self.owner_id.set(owner_id).is_ok() {
            tracing::info!(owner_id, "Bot owner resolved");
        }
    }

    pub fn owner_id(&self) -> Option<u64> {
        self.owner_id.get().copied()
    }

    /// Parse and run a message. `None` when it is not a command.
    pub async fn handle(&self, author_id: u64, content: &str) -> Option<Reply> {
        let reply = match parse(content)? {
            Ok(command) => {
                tracing::debug!(author_id, ?command, "Running command");
                self.execute(author_id, command).await
            }
            Err(e) => Err(e),
        };
        Some(reply.unwrap_or_else(|e| e.reply()))
    }

    pub async fn execute(&self, author_id: u64, command: Command) -> BotResult<Reply> {
        match command {
            Command::AddClan(name) => self.add_clan(author_id, &name).await,
            Command::RemoveClan(name) => self.remove_clan(author_id, &name).await,
            Command::Clans => self.list_clans().await,
            Command::AddMember { clan, username } => self.add_member(&clan, &username).await,
            Command::RemoveMember(username) => self.remove_member(&username).await,
            Command::Clan(name) => self.clan_report(&name).await,
            Command::Help => Ok(Reply::info("📖 Commands", help_text())),
        }
    }

    fn require_owner(&self, author_id: u64, action: &str) -> BotResult<()> {
        if self.owner_id() == Some(author_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!("Only the bot owner can {action}!")).into())
        }
    }

    async fn find_clan(&self, name: &str) -> BotResult<Clan> {
        self.store
            .find_clan_by_name(name)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Clan",
                    key: name.to_string(),
                }
                .into()
            })
    }

    async fn add_clan(&self, author_id: u64, name: &str) -> BotResult<Reply> {
        self.require_owner(author_id, "create clans")?;
        check_length(name, "Clan name", CLAN_NAME_LEN)?;

        let clan = self.store.add_clan(name).await.map_err(|e| match e {
            StoreError::Conflict(_) => {
                BotError::from(CoreError::Conflict(format!("Clan '{name}' already exists!")))
            }
            other => other.into(),
        })?;

        tracing::info!(clan = %clan.name, clan_id = clan.id, "Clan created");
        Ok(Reply::success(
            "Clan Created",
            format!(
                "Successfully created clan **{}**!\nUse `!addmember {} <username>` to add members.",
                clan.name, clan.name
            ),
        ))
    }

    async fn remove_clan(&self, author_id: u64, name: &str) -> BotResult<Reply> {
        self.require_owner(author_id, "remove clans")?;

        if !self.store.remove_clan(name).await? {
            return Err(CoreError::NotFound {
                entity: "Clan",
                key: name.to_string(),
            }
            .into());
        }

        tracing::info!(clan = %name, "Clan removed");
        Ok(Reply::success(
            "Clan Removed",
            format!("Successfully removed clan **{name}** and all its members."),
        ))
    }

    async fn list_clans(&self) -> BotResult<Reply> {
        let clans = self.store.list_clans().await?;
        if clans.is_empty() {
            return Ok(Reply::info(
                "📋 Clans",
                "No clans yet. Use `!addclan <name>` to create one.",
            ));
        }

        let mut lines = Vec::with_capacity(clans.len());
        for clan in &clans {
            let count = self.store.clan_members(clan.id).await?.len();
            lines.push(format!("• **{}** ({count} members)", clan.name));
        }
        Ok(Reply::info("📋 Clans", lines.join("\n")))
    }

    async fn add_member(&self, clan_name: &str, username: &str) -> BotResult<Reply> {
        check_length(username, "Username", USERNAME_LEN)?;
        let clan = self.find_clan(clan_name).await?;

        self.store
            .add_member(username, clan.id)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => BotError::from(CoreError::Conflict(format!(
                    "Player '{username}' is already in a clan!"
                ))),
                StoreError::ClanNotFound(_) => BotError::from(CoreError::NotFound {
                    entity: "Clan",
                    key: clan.name.clone(),
                }),
                other => other.into(),
            })?;
        tracing::info!(username, clan = %clan.name, "Member added");

        let outcome = self.engine.force_check(username).await;
        let mut description = format!(
            "Successfully added **{username}** to clan **{}**!\n{}",
            clan.name,
            status_line(outcome.status.is_online, outcome.status.rank),
        );
        if !outcome.persisted {
            description
                .push_str("\n⚠️ The status could not be saved yet; the next check will retry.");
        }
        Ok(Reply::success("Member Added", description))
    }

    async fn remove_member(&self, username: &str) -> BotResult<Reply> {
        match self.store.remove_member(username).await? {
            Some(clan) => {
                tracing::info!(username, clan = %clan, "Member removed");
                Ok(Reply::success(
                    "Member Removed",
                    format!("Successfully removed **{username}** from **{clan}**."),
                ))
            }
            None => Err(CoreError::NotFound {
                entity: "Player",
                key: username.to_string(),
            }
            .into()),
        }
    }

    async fn clan_report(&self, name: &str) -> BotResult<Reply> {
        let clan = self.find_clan(name).await?;
        let members = self.store.clan_members(clan.id).await?;
        Ok(Reply::Clan(ClanReport::new(clan.name, members)))
    }
}

fn status_line(is_online: bool, rank: Rank) -> String {
    let presence = if is_online {
        "🟢 Online"
    } else {
        "🔴 Offline"
    };
    format!("Status: {presence} | Rank: {} {rank}", rank_icon(rank))
}

fn help_text() -> String {
    [
        "`!addclan <name>` create a clan (owner only)",
        "`!removeclan <name>` delete a clan and its members (owner only)",
        "`!clans` list clans",
        "`!addmember <clan> <username>` add a player and check their status",
        "`!removemember <username>` remove a player",
        "`!clan <name>` show a clan's members",
    ]
    .join("\n")
}
