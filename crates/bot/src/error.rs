use clanwatch_core::error::CoreError;
use clanwatch_core::roster::StoreError;

use crate::reply::Reply;

/// Front end error type.
///
/// Command failures are turned into failure replies with
/// [`BotError::reply`]; startup failures are logged by the binary.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// A domain-level error from `clanwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The roster store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A database error during startup.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migrations could not be applied.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The Discord client failed.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Binding or serving the liveness endpoint failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for command results.
pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    /// The reply shown to the user who issued the failing command.
    ///
    /// Domain errors carry user-facing text; everything else is logged
    /// and replaced with a generic message.
    pub fn reply(&self) -> Reply {
        match self {
            BotError::Core(core) => match core {
                CoreError::NotFound { entity, key } => Reply::failure(
                    format!("{entity} Not Found"),
                    format!("{entity} '{key}' not found!"),
                ),
                CoreError::Validation(msg) => Reply::failure("Invalid Input", msg),
                CoreError::Conflict(msg) => Reply::failure("Already Exists", msg),
                CoreError::Forbidden(msg) => Reply::failure("Permission Denied", msg),
            },
            BotError::Store(StoreError::Conflict(msg)) => Reply::failure("Already Exists", msg),
            BotError::Store(StoreError::ClanNotFound(id)) => {
                Reply::failure("Clan Not Found", format!("Clan {id} no longer exists!"))
            }
            other => {
                tracing::error!(error = %other, "Command failed");
                Reply::failure("Error", "Something went wrong, please try again later.")
            }
        }
    }
}
