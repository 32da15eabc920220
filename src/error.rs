use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors surfaced to the caller of a game operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game is full: two players are already playing")]
    CapacityExceeded,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match self {
            GameError::CapacityExceeded => StatusCode::CONFLICT,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Reasons a move is rejected. Folded into `MoveOutcome::reason`, never returned as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game is not ready: waiting for a second player")]
    NotReady,

    #[error("game is already over")]
    GameOver,

    #[error("it is not player {player_id}'s turn")]
    NotYourTurn { player_id: i64 },

    #[error("column {column} is outside 1..={columns}")]
    ColumnOutOfRange { column: i64, columns: usize },

    #[error("column {column} is full")]
    ColumnFull { column: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        let err = MoveError::ColumnOutOfRange {
            column: 9,
            columns: 7,
        };
        assert_eq!(err.to_string(), "column 9 is outside 1..=7");
        assert_eq!(
            MoveError::NotYourTurn { player_id: 2 }.to_string(),
            "it is not player 2's turn"
        );
    }

    #[test]
    fn test_capacity_exceeded_is_conflict() {
        let response = GameError::CapacityExceeded.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
