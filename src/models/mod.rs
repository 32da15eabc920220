pub mod game;

pub use game::{
    // Board contents
    Cell,
    // Live game state (for HTTP/WebSocket)
    GamePhase, GameState, MoveOutcome, Player, PlayerIdentity, Slot, TurnInfo,
    // Requests
    MoveRequest, RegisterRequest,
};
