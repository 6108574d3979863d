//! Roster data model and the store contract consumed by the monitor and
//! the chat front end.
//!
//! A roster is a set of clans, each holding members keyed by game
//! username. A username belongs to at most one clan. Status writes are a
//! full replace of `(rank, is_online, last_updated)`, so concurrent
//! writers resolve as last-writer-wins per username.

use async_trait::async_trait;

use crate::rank::{rank_for_experience, Rank};
use crate::types::{DbId, Timestamp};

/// A named group of members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clan {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// A clan member and their last-known status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: DbId,
    pub username: String,
    pub clan_id: DbId,
    pub rank: Rank,
    pub is_online: bool,
    pub last_updated: Timestamp,
    pub created_at: Timestamp,
}

/// A normalised status lookup result for one player.
///
/// Build through [`PlayerStatus::new`] so that a known experience figure
/// always decides the rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub username: String,
    pub rank: Rank,
    pub is_online: bool,
    pub experience: Option<u64>,
}

impl PlayerStatus {
    pub fn new(
        username: impl Into<String>,
        rank: Rank,
        is_online: bool,
        experience: Option<u64>,
    ) -> Self {
        let rank = experience.map(rank_for_experience).unwrap_or(rank);
        Self {
            username: username.into(),
            rank,
            is_online,
            experience,
        }
    }
}

/// Errors raised by a roster store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the query.
    #[error("Roster backend error: {0}")]
    Backend(String),

    /// A uniqueness rule was violated (duplicate clan name or member).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced clan does not exist.
    #[error("Clan {0} not found")]
    ClanNotFound(DbId),
}

/// Persistence contract for clans and members.
///
/// Implemented by the Postgres store and the in-memory store in
/// `clanwatch-db`.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Create a clan. Fails with [`StoreError::Conflict`] if the name is taken.
    async fn add_clan(&self, name: &str) -> Result<Clan, StoreError>;

    /// All clans ordered by id.
    async fn list_clans(&self) -> Result<Vec<Clan>, StoreError>;

    /// Case-sensitive lookup by clan name.
    async fn find_clan_by_name(&self, name: &str) -> Result<Option<Clan>, StoreError>;

    /// Delete a clan and all its members. Returns `false` if it did not exist.
    async fn remove_clan(&self, name: &str) -> Result<bool, StoreError>;

    /// Add a member to a clan. Fails with [`StoreError::Conflict`] if the
    /// username is already in any clan and [`StoreError::ClanNotFound`] if
    /// the clan is missing.
    async fn add_member(&self, username: &str, clan_id: DbId) -> Result<Member, StoreError>;

    /// Remove a member. Returns the name of the clan they left, or `None`
    /// if no such member exists.
    async fn remove_member(&self, username: &str) -> Result<Option<String>, StoreError>;

    /// Members of one clan ordered by username.
    async fn clan_members(&self, clan_id: DbId) -> Result<Vec<Member>, StoreError>;

    /// Snapshot of every member across all clans.
    async fn list_members(&self) -> Result<Vec<Member>, StoreError>;

    /// Replace a member's status fields and stamp `last_updated`.
    /// Returns `false` if the username is not on the roster.
    async fn update_status(
        &self,
        username: &str,
        rank: Rank,
        is_online: bool,
    ) -> Result<bool, StoreError>;
}
