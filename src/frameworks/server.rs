// Framework bootstrap for the arena server runtime.

use crate::domain::tuning::Tuning;
use crate::frameworks::config::{self, ServerSettings};
use crate::interface_adapters::net::{
    create_room_handler, list_rooms_handler, ranking_handler, ws_handler,
};
use crate::interface_adapters::state::{AppState, JsonFileStore, SystemClock};
use crate::use_cases::{RankingService, RoomDirectory, RoomSettings};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    // Room tasks run in isolation; a panicking tick only takes its own room down.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms", get(list_rooms_handler).post(create_room_handler))
        .route("/ranking", get(ranking_handler))
        .with_state(state)
}

pub async fn run(listener: tokio::net::TcpListener, settings: ServerSettings) -> Result<()> {
    let address = listener.local_addr()?;
    let app = router(build_state(settings));

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::bind_addr(), config::http_port());

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, ServerSettings::from_env()).await
}

fn build_state(settings: ServerSettings) -> Arc<AppState> {
    let mut tuning = Tuning::default();
    tuning.cannon.charge_authority = settings.charge_authority;
    tracing::debug!(
        leaderboard_path = %settings.leaderboard_path.display(),
        charge_authority = ?settings.charge_authority,
        empty_room_grace_secs = settings.empty_room_grace.as_secs(),
        "server configured"
    );

    // The directory owns the set of active room world tasks.
    let directory = Arc::new(RoomDirectory::new(RoomSettings {
        input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
        room_broadcast_capacity: config::ROOM_BROADCAST_CAPACITY,
        lobby_broadcast_capacity: config::LOBBY_BROADCAST_CAPACITY,
        empty_room_grace: settings.empty_room_grace,
        tuning,
    }));

    let ranking = Arc::new(RankingService::new(
        SystemClock,
        JsonFileStore::new(settings.leaderboard_path),
    ));

    Arc::new(AppState { directory, ranking })
}
