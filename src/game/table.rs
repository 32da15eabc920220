use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::{
    error::GameError,
    game::GameEngine,
    models::{GamePhase, GameState, MoveOutcome, PlayerIdentity, RegisterRequest, Slot},
};

/// Capacity of the state update channel; slow subscribers skip ahead
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Shared handle to the one live game.
///
/// Every operation takes the engine lock for exactly one engine call, so the
/// read-validate-mutate sequence of a move never interleaves with another
/// request. Snapshots are published before the lock is released, so
/// subscribers see them in commit order. Nothing awaits while the lock is held.
#[derive(Clone)]
pub struct GameTable {
    engine: Arc<Mutex<GameEngine>>,
    updates: broadcast::Sender<GameState>,
}

impl GameTable {
    pub fn new(engine: GameEngine) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            updates,
        }
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> broadcast::Receiver<GameState> {
        self.updates.subscribe()
    }

    /// Join the game, or abandon it when the request carries the abandon sentinel
    pub async fn register(&self, request: &RegisterRequest) -> Result<PlayerIdentity, GameError> {
        if request.is_abandon() {
            return Ok(self.abandon().await);
        }

        let mut engine = self.engine.lock().await;
        let identity = engine.register_player(&request.name)?;
        self.publish(engine.status());
        Ok(identity)
    }

    pub async fn abandon(&self) -> PlayerIdentity {
        let mut engine = self.engine.lock().await;
        let identity = engine.abandon();
        self.publish(engine.status());
        identity
    }

    /// Abandon an unfinished game, but only if `identity` is still seated in it
    pub async fn abandon_if_seated(&self, identity: &PlayerIdentity) -> bool {
        let mut engine = self.engine.lock().await;
        if engine.phase() == GamePhase::Finished || !engine.holds_seat(identity) {
            return false;
        }
        engine.abandon();
        self.publish(engine.status());
        true
    }

    pub async fn status(&self) -> GameState {
        self.engine.lock().await.status()
    }

    pub async fn turn(&self) -> Slot {
        self.engine.lock().await.turn()
    }

    pub async fn attempt_move(&self, player_id: i64, column: i64) -> MoveOutcome {
        let mut engine = self.engine.lock().await;
        let outcome = engine.attempt_move(player_id, column);
        if outcome.accepted {
            self.publish(outcome.state.clone());
        }
        outcome
    }

    /// Move on behalf of a bound identity. `None` when it no longer holds its
    /// seat, in which case the board is untouched.
    pub async fn attempt_seated_move(
        &self,
        identity: &PlayerIdentity,
        player_id: i64,
        column: i64,
    ) -> Option<MoveOutcome> {
        let mut engine = self.engine.lock().await;
        if !engine.holds_seat(identity) {
            return None;
        }
        let outcome = engine.attempt_move(player_id, column);
        if outcome.accepted {
            self.publish(outcome.state.clone());
        }
        Some(outcome)
    }

    pub async fn reset(&self) {
        let mut engine = self.engine.lock().await;
        engine.reset();
        self.publish(engine.status());
    }

    fn publish(&self, state: GameState) {
        // No subscribers is fine
        let _ = self.updates.send(state);
    }
}
