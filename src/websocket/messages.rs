use serde::{Deserialize, Serialize};

use crate::models::{GameState, MoveOutcome, PlayerIdentity};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Register {
        name: String,
        /// -1 abandons the game, same as `Abandon`
        #[serde(default)]
        player_id: Option<i64>,
    },
    Abandon,
    GetStatus,
    GetTurn,
    AttemptMove {
        player_id: i64,
        column: i64,
    },
    Reset,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Registered {
        player: PlayerIdentity,
    },
    Abandoned,
    Status {
        state: GameState,
    },
    Turn {
        player_id: u8,
    },
    MoveResult {
        outcome: MoveOutcome,
    },
    /// Pushed to every open socket after any change to the game
    StateChanged {
        state: GameState,
    },
    Error {
        message: String,
    },
}
