use clanwatch_core::roster::Clan;
use clanwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `clans` table.
#[derive(Debug, Clone, FromRow)]
pub struct ClanRow {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

impl From<ClanRow> for Clan {
    fn from(row: ClanRow) -> Self {
        Clan {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}
