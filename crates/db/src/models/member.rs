use clanwatch_core::rank::Rank;
use clanwatch_core::roster::Member;
use clanwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `members` table. `rank` is stored as the display name.
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub id: DbId,
    pub username: String,
    pub clan_id: DbId,
    pub rank: String,
    pub is_online: bool,
    pub last_updated: Timestamp,
    pub created_at: Timestamp,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            username: row.username,
            clan_id: row.clan_id,
            rank: Rank::from_stored(&row.rank),
            is_online: row.is_online,
            last_updated: row.last_updated,
            created_at: row.created_at,
        }
    }
}
