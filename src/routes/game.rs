use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::GameError,
    models::{GameState, MoveOutcome, MoveRequest, PlayerIdentity, RegisterRequest, TurnInfo},
    AppState,
};

/// Join the game. A `player_id` of -1 abandons it instead.
pub async fn register_player(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<PlayerIdentity>, GameError> {
    let identity = state.table.register(&request).await?;
    Ok(Json(identity))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<GameState> {
    Json(state.table.status().await)
}

pub async fn get_turn(State(state): State<Arc<AppState>>) -> Json<TurnInfo> {
    let slot = state.table.turn().await;
    Json(TurnInfo {
        player_id: slot.id(),
    })
}

/// Always 200: rejection is reported in the body
pub async fn attempt_move(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoveRequest>,
) -> Json<MoveOutcome> {
    Json(
        state
            .table
            .attempt_move(request.player_id, request.column)
            .await,
    )
}

pub async fn reset(State(state): State<Arc<AppState>>) -> StatusCode {
    tracing::info!("Reset requested over HTTP");
    state.table.reset().await;
    StatusCode::NO_CONTENT
}
