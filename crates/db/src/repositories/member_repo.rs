//! Repository for the `members` table.

use clanwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::MemberRow;

/// Column list for `members` queries.
const COLUMNS: &str = "id, username, clan_id, rank, is_online, last_updated, created_at";

/// Provides query operations for clan members.
pub struct MemberRepo;

impl MemberRepo {
    /// Insert a member into a clan with default status.
    pub async fn create(
        pool: &PgPool,
        username: &str,
        clan_id: DbId,
    ) -> Result<MemberRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO members (username, clan_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MemberRow>(&query)
            .bind(username)
            .bind(clan_id)
            .fetch_one(pool)
            .await
    }

    /// List every member ordered by ID.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<MemberRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members ORDER BY id ASC");
        sqlx::query_as::<_, MemberRow>(&query).fetch_all(pool).await
    }

    /// List the members of one clan ordered by username.
    pub async fn list_by_clan(pool: &PgPool, clan_id: DbId) -> Result<Vec<MemberRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM members WHERE clan_id = $1 ORDER BY username ASC");
        sqlx::query_as::<_, MemberRow>(&query)
            .bind(clan_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a member and return the name of the clan they belonged to.
    pub async fn delete_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "DELETE FROM members m USING clans c \
             WHERE m.clan_id = c.id AND m.username = $1 \
             RETURNING c.name",
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Overwrite the status columns for a member.
    /// Returns `true` if a row was updated.
    pub async fn update_status(
        pool: &PgPool,
        username: &str,
        rank: &str,
        is_online: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE members SET rank = $2, is_online = $3, last_updated = NOW() \
             WHERE username = $1",
        )
        .bind(username)
        .bind(rank)
        .bind(is_online)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
