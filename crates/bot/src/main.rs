use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use clanwatch_core::roster::RosterStore;
use clanwatch_db::{MemoryRosterStore, PgRosterStore};
use clanwatch_monitor::chain::StrategyChain;
use clanwatch_monitor::engine::MonitoringEngine;
use clanwatch_monitor::peer::{ChatGateway, PeerBotQuery};
use clanwatch_monitor::web::WebLookup;
use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clanwatch_bot::commands::Commands;
use clanwatch_bot::config::BotConfig;
use clanwatch_bot::discord::{Handler, SerenityGateway};
use clanwatch_bot::error::BotError;
use clanwatch_bot::health::{self, BotStatus};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "clanwatch_bot=info,clanwatch_monitor=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Bot exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BotError> {
    // --- Configuration ---
    let config = BotConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        peer_bot = ?config.monitor.peer_bot_id,
        "Loaded bot configuration",
    );

    // --- Roster store ---
    let store = open_store(&config).await?;

    // --- Monitoring ---
    let http = Arc::new(Http::new(&config.discord_token));
    let gateway = Arc::new(SerenityGateway::new(Arc::clone(&http)));
    let peer_gateway: Arc<dyn ChatGateway> = gateway.clone();
    let peer = PeerBotQuery::new(
        Some(peer_gateway),
        config.monitor.peer_bot_id,
        config.monitor.peer_reply_timeout,
    );
    if !peer.is_enabled() {
        tracing::info!("No peer bot configured, peer lookups disabled");
    }
    let web = WebLookup::new(
        config.monitor.web_endpoints.clone(),
        config.monitor.web_request_timeout,
    );
    let engine = Arc::new(MonitoringEngine::new(
        Arc::clone(&store),
        StrategyChain::standard(peer, web),
        config.monitor.clone(),
    ));

    let commands = Arc::new(Commands::new(store, Arc::clone(&engine), config.owner_id));
    let status = Arc::new(BotStatus::new());

    // --- Liveness server ---
    let host: IpAddr = config
        .host
        .parse()
        .map_err(|_| BotError::Config(format!("Invalid HOST address '{}'", config.host)))?;
    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Liveness server listening");

    let app = health::router(Arc::clone(&status)).layer(TraceLayer::new_for_http());
    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Liveness server failed");
        }
    });

    // --- Discord client ---
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let handler = Handler::new(
        commands,
        Arc::clone(&engine),
        Arc::clone(&status),
        gateway.feed(),
    );
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;
    gateway.attach_cache(Arc::clone(&client.cache));

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        shutdown_signal().await;
        shard_manager.shutdown_all().await;
    });

    let result = client.start().await;

    // --- Post-shutdown cleanup ---
    status.set_disconnected();
    engine.stop().await;
    tracing::info!("Monitoring stopped");

    http_handle.abort();
    tracing::info!("Shutdown complete");

    result.map_err(BotError::from)
}

/// Postgres when `DATABASE_URL` is set, otherwise an in-memory roster.
async fn open_store(config: &BotConfig) -> Result<Arc<dyn RosterStore>, BotError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, roster is kept in memory and lost on restart");
        return Ok(Arc::new(MemoryRosterStore::new()));
    };

    let pool = clanwatch_db::create_pool(database_url).await?;
    tracing::info!("Database connection pool created");

    clanwatch_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    clanwatch_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgRosterStore::new(pool)))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
