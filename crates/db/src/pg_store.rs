//! PostgreSQL-backed [`RosterStore`].

use async_trait::async_trait;
use clanwatch_core::rank::Rank;
use clanwatch_core::roster::{Clan, Member, RosterStore, StoreError};
use clanwatch_core::types::DbId;

use crate::repositories::{ClanRepo, MemberRepo};
use crate::DbPool;

/// Roster store over a shared connection pool. Cheap to clone.
#[derive(Clone)]
pub struct PgRosterStore {
    pool: DbPool,
}

impl PgRosterStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error onto the store taxonomy, turning constraint
/// violations into conflicts.
fn classify(err: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(conflict())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl RosterStore for PgRosterStore {
    async fn add_clan(&self, name: &str) -> Result<Clan, StoreError> {
        let row = ClanRepo::create(&self.pool, name)
            .await
            .map_err(|e| classify(e, || format!("clan '{name}' already exists")))?;
        tracing::info!(clan_id = row.id, clan = %row.name, "Clan created");
        Ok(row.into())
    }

    async fn list_clans(&self) -> Result<Vec<Clan>, StoreError> {
        let rows = ClanRepo::list(&self.pool).await.map_err(backend)?;
        Ok(rows.into_iter().map(Clan::from).collect())
    }

    async fn find_clan_by_name(&self, name: &str) -> Result<Option<Clan>, StoreError> {
        let row = ClanRepo::find_by_name(&self.pool, name)
            .await
            .map_err(backend)?;
        Ok(row.map(Clan::from))
    }

    async fn remove_clan(&self, name: &str) -> Result<bool, StoreError> {
        ClanRepo::delete_by_name(&self.pool, name)
            .await
            .map_err(backend)
    }

    async fn add_member(&self, username: &str, clan_id: DbId) -> Result<Member, StoreError> {
        if ClanRepo::find_by_id(&self.pool, clan_id)
            .await
            .map_err(backend)?
            .is_none()
        {
            return Err(StoreError::ClanNotFound(clan_id));
        }

        let row = MemberRepo::create(&self.pool, username, clan_id)
            .await
            .map_err(|e| {
                let missing_clan = matches!(
                    &e,
                    sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation()
                );
                if missing_clan {
                    StoreError::ClanNotFound(clan_id)
                } else {
                    classify(e, || format!("'{username}' is already in a clan"))
                }
            })?;
        Ok(row.into())
    }

    async fn remove_member(&self, username: &str) -> Result<Option<String>, StoreError> {
        MemberRepo::delete_by_username(&self.pool, username)
            .await
            .map_err(backend)
    }

    async fn clan_members(&self, clan_id: DbId) -> Result<Vec<Member>, StoreError> {
        let rows = MemberRepo::list_by_clan(&self.pool, clan_id)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let rows = MemberRepo::list_all(&self.pool).await.map_err(backend)?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    async fn update_status(
        &self,
        username: &str,
        rank: Rank,
        is_online: bool,
    ) -> Result<bool, StoreError> {
        MemberRepo::update_status(&self.pool, username, rank.as_str(), is_online)
            .await
            .map_err(backend)
    }
}
