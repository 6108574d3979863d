//! In-process [`RosterStore`] used when no database is configured.
//!
//! State is lost on restart. All operations take a single lock, so each
//! call is atomic with respect to the others.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use clanwatch_core::rank::Rank;
use clanwatch_core::roster::{Clan, Member, RosterStore, StoreError};
use clanwatch_core::types::DbId;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_clan_id: DbId,
    next_member_id: DbId,
    clans: BTreeMap<DbId, Clan>,
    /// Keyed by username.
    members: BTreeMap<String, Member>,
}

/// Roster store held entirely in memory.
#[derive(Default)]
pub struct MemoryRosterStore {
    inner: RwLock<Inner>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn add_clan(&self, name: &str) -> Result<Clan, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.clans.values().any(|c| c.name == name) {
            return Err(StoreError::Conflict(format!("clan '{name}' already exists")));
        }
        inner.next_clan_id += 1;
        let clan = Clan {
            id: inner.next_clan_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.clans.insert(clan.id, clan.clone());
        tracing::info!(clan_id = clan.id, clan = %clan.name, "Clan created");
        Ok(clan)
    }

    async fn list_clans(&self) -> Result<Vec<Clan>, StoreError> {
        Ok(self.inner.read().await.clans.values().cloned().collect())
    }

    async fn find_clan_by_name(&self, name: &str) -> Result<Option<Clan>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.clans.values().find(|c| c.name == name).cloned())
    }

    async fn remove_clan(&self, name: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(id) = inner.clans.values().find(|c| c.name == name).map(|c| c.id) else {
            return Ok(false);
        };
        inner.clans.remove(&id);
        inner.members.retain(|_, m| m.clan_id != id);
        Ok(true)
    }

    async fn add_member(&self, username: &str, clan_id: DbId) -> Result<Member, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.members.contains_key(username) {
            return Err(StoreError::Conflict(format!(
                "'{username}' is already in a clan"
            )));
        }
        if !inner.clans.contains_key(&clan_id) {
            return Err(StoreError::ClanNotFound(clan_id));
        }
        inner.next_member_id += 1;
        let now = Utc::now();
        let member = Member {
            id: inner.next_member_id,
            username: username.to_string(),
            clan_id,
            rank: Rank::Unknown,
            is_online: false,
            last_updated: now,
            created_at: now,
        };
        inner.members.insert(member.username.clone(), member.clone());
        Ok(member)
    }

    async fn remove_member(&self, username: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(member) = inner.members.remove(username) else {
            return Ok(None);
        };
        Ok(inner.clans.get(&member.clan_id).map(|c| c.name.clone()))
    }

    async fn clan_members(&self, clan_id: DbId) -> Result<Vec<Member>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .values()
            .filter(|m| m.clan_id == clan_id)
            .cloned()
            .collect())
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let inner = self.inner.read().await;
        let mut members: Vec<Member> = inner.members.values().cloned().collect();
        members.sort_by_key(|m| m.id);
        Ok(members)
    }

    async fn update_status(
        &self,
        username: &str,
        rank: Rank,
        is_online: bool,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(member) = inner.members.get_mut(username) else {
            return Ok(false);
        };
        member.rank = rank;
        member.is_online = is_online;
        member.last_updated = Utc::now();
        Ok(true)
    }
}
