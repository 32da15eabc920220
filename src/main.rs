mod config;
mod error;
mod game;
mod models;
mod routes;
mod websocket;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use config::Config;
use dashmap::DashMap;
use game::{GameEngine, GameTable};
use models::PlayerIdentity;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use websocket::messages::ServerMessage;

/// An open WebSocket connection
#[derive(Debug, Clone)]
pub struct Session {
    pub connection_id: Uuid,
    /// Set once the connection registers as a player
    pub player: Option<PlayerIdentity>,
    pub connected_at: DateTime<Utc>,
    pub tx: mpsc::Sender<ServerMessage>,
}

impl Session {
    pub fn new(connection_id: Uuid, tx: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            connection_id,
            player: None,
            connected_at: Utc::now(),
            tx,
        }
    }
}

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub table: GameTable,
    /// Open WebSocket connections keyed by connection id
    pub sessions: DashMap<Uuid, Session>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = GameEngine::new(
            config.game.rows,
            config.game.columns,
            config.game.turn_policy(),
        );
        Self {
            config,
            table: GameTable::new(engine),
            sessions: DashMap::new(),
        }
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connect_four_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Connect Four server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        "Configuration loaded: {}x{} board, {:?} starting turn",
        config.game.rows,
        config.game.columns,
        config.game.starting_turn
    );

    let state = Arc::new(AppState::new(config.clone()));

    // Spawn background task pushing every state change to open sockets
    let fanout_state = state.clone();
    tokio::spawn(async move {
        state_fanout_task(fanout_state).await;
    });

    let app = build_app(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Background task that forwards game state changes to every WebSocket session
async fn state_fanout_task(state: Arc<AppState>) {
    let mut updates = state.table.subscribe();

    loop {
        match updates.recv().await {
            Ok(game_state) => websocket::broadcast_state(&state, game_state),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("State fan-out lagged, skipped {} updates", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
