use clanwatch_monitor::config::MonitorConfig;

use crate::error::BotError;

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot token.
    pub discord_token: String,
    /// Postgres connection string. Unset means an in-memory roster.
    pub database_url: Option<String>,
    /// Discord user allowed to create and remove clans. When unset the
    /// application owner is looked up at startup.
    pub owner_id: Option<u64>,
    /// Liveness bind address (default: `0.0.0.0`).
    pub host: String,
    /// Liveness port (default: `5000`).
    pub port: u16,
    pub monitor: MonitorConfig,
}

impl BotConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var         | Default                  |
    /// |-----------------|--------------------------|
    /// | `DISCORD_TOKEN` | required                 |
    /// | `DATABASE_URL`  | unset (in-memory roster) |
    /// | `BOT_OWNER_ID`  | application owner        |
    /// | `HOST`          | `0.0.0.0`                |
    /// | `PORT`          | `5000`                   |
    ///
    /// Monitoring variables are read by [`MonitorConfig::from_env`].
    pub fn from_env() -> Result<Self, BotError> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BotError::Config("DISCORD_TOKEN must be set".into()))?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let owner_id = match std::env::var("BOT_OWNER_ID") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| BotError::Config("BOT_OWNER_ID must be a valid u64".into()))?,
            ),
            Err(_) => None,
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .trim()
            .parse()
            .map_err(|_| BotError::Config("PORT must be a valid u16".into()))?;

        Ok(Self {
            discord_token,
            database_url,
            owner_id,
            host,
            port,
            monitor: MonitorConfig::from_env(),
        })
    }
}
