use serde::{Deserialize, Serialize};

/// Player id carried by a registration request to abandon the current game
pub const ABANDON_PLAYER_ID: i64 = -1;

/// One of the two player seats. Serialized as its integer id (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn id(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }

    /// Map a client-supplied id onto a slot, if it names one
    pub fn from_id(id: i64) -> Option<Slot> {
        match id {
            1 => Some(Slot::One),
            2 => Some(Slot::Two),
            _ => None,
        }
    }

    /// The piece this slot drops onto the board
    pub fn piece(self) -> Cell {
        match self {
            Slot::One => Cell::Player1,
            Slot::Two => Cell::Player2,
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.id()
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Slot::from_id(id as i64).ok_or_else(|| format!("invalid player slot: {}", id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Player1,
    Player2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: Slot,
    pub name: String,
}

/// What a client gets back from registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// 1 or 2, or 0 for the empty identity returned on abandon
    pub player_id: u8,
    pub name: String,
    /// Game the seat was taken in; bumped on every reset, 0 for the empty identity
    #[serde(default)]
    pub game_epoch: u64,
}

impl PlayerIdentity {
    pub fn seated(player: &Player, game_epoch: u64) -> Self {
        Self {
            player_id: player.player_id.id(),
            name: player.name.clone(),
            game_epoch,
        }
    }

    pub fn empty() -> Self {
        Self {
            player_id: 0,
            name: String::new(),
            game_epoch: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.player_id == 0
    }
}

/// Where a single game instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Empty,
    WaitingForSecond,
    InProgress,
    Finished,
}

/// Snapshot of the whole game, returned by every operation that reads state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Row 0 is the top of the board
    pub board: Vec<Vec<Cell>>,
    pub rows: usize,
    pub columns: usize,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    pub current_turn: Slot,
    pub is_game_over: bool,
    /// `None` with `is_game_over` set means a draw
    pub winner: Option<Player>,
    pub phase: GamePhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub player_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub accepted: bool,
    pub state: GameState,
    /// Why a move was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    /// Only ever set to [`ABANDON_PLAYER_ID`] by a client leaving early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<i64>,
}

impl RegisterRequest {
    pub fn join(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            player_id: None,
        }
    }

    pub fn abandon() -> Self {
        Self {
            name: String::new(),
            player_id: Some(ABANDON_PLAYER_ID),
        }
    }

    pub fn is_abandon(&self) -> bool {
        self.player_id == Some(ABANDON_PLAYER_ID)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveRequest {
    pub player_id: i64,
    /// 1-indexed
    pub column: i64,
}
