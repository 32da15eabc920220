pub mod game;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/game/players", post(game::register_player))
        .route("/game/status", get(game::get_status))
        .route("/game/turn", get(game::get_turn))
        .route("/game/moves", post(game::attempt_move))
        .route("/game/reset", post(game::reset))
}
