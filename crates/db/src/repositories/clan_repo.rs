//! Repository for the `clans` table.

use clanwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::clan::ClanRow;

/// Column list for `clans` queries.
const COLUMNS: &str = "id, name, created_at";

/// Provides query operations for clans.
pub struct ClanRepo;

impl ClanRepo {
    /// Insert a clan and return the stored row.
    pub async fn create(pool: &PgPool, name: &str) -> Result<ClanRow, sqlx::Error> {
        let query = format!("INSERT INTO clans (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, ClanRow>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// List all clans ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<ClanRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clans ORDER BY id ASC");
        sqlx::query_as::<_, ClanRow>(&query).fetch_all(pool).await
    }

    /// Find a clan by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClanRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clans WHERE id = $1");
        sqlx::query_as::<_, ClanRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a clan by exact name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<ClanRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clans WHERE name = $1");
        sqlx::query_as::<_, ClanRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Delete a clan by name. Members go with it via `ON DELETE CASCADE`.
    /// Returns `true` if a row was removed.
    pub async fn delete_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clans WHERE name = $1")
            .bind(name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
