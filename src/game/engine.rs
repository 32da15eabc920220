use crate::{
    error::{GameError, MoveError},
    game::{Board, TurnPolicy},
    models::{GamePhase, GameState, MoveOutcome, Player, PlayerIdentity, Slot},
};

/// Authoritative state machine for a single Connect Four game.
///
/// `Empty -> WaitingForSecond -> InProgress -> Finished`, and back to `Empty`
/// only through [`GameEngine::reset`] (called automatically when someone
/// registers at a finished table, or explicitly on abandon).
#[derive(Debug)]
pub struct GameEngine {
    board: Board,
    player1: Option<Player>,
    player2: Option<Player>,
    current_turn: Slot,
    is_game_over: bool,
    winner: Option<Slot>,
    /// Identifies the current game; seats from earlier games never match it
    game_epoch: u64,
    turn_policy: TurnPolicy,
}

impl GameEngine {
    pub fn new(rows: usize, columns: usize, mut turn_policy: TurnPolicy) -> Self {
        let current_turn = turn_policy.starting_slot();
        Self {
            board: Board::new(rows, columns),
            player1: None,
            player2: None,
            current_turn,
            is_game_over: false,
            winner: None,
            game_epoch: 1,
            turn_policy,
        }
    }

    /// Seat a new player in the next free slot, in arrival order
    pub fn register_player(&mut self, name: &str) -> Result<PlayerIdentity, GameError> {
        if self.is_game_over {
            tracing::info!("Previous game finished, resetting table for new players");
            self.reset();
        }

        let slot = match (&self.player1, &self.player2) {
            (None, _) => Slot::One,
            (Some(_), None) => Slot::Two,
            (Some(_), Some(_)) => {
                tracing::warn!("Rejected registration of {}: table is full", name);
                return Err(GameError::CapacityExceeded);
            }
        };

        let player = Player {
            player_id: slot,
            name: name.to_string(),
        };
        let identity = PlayerIdentity::seated(&player, self.game_epoch);
        match slot {
            Slot::One => self.player1 = Some(player),
            Slot::Two => self.player2 = Some(player),
        }

        tracing::info!("Player {} joined as player {}", name, slot.id());
        if self.is_ready() {
            tracing::info!(
                "Both players seated, player {} moves first",
                self.current_turn.id()
            );
        }

        Ok(identity)
    }

    /// A client leaving early: wipe the table and hand back the empty identity
    pub fn abandon(&mut self) -> PlayerIdentity {
        tracing::info!("Game abandoned");
        self.reset();
        PlayerIdentity::empty()
    }

    pub fn status(&self) -> GameState {
        GameState {
            board: self.board.cells().to_vec(),
            rows: self.board.rows(),
            columns: self.board.columns(),
            player1: self.player1.clone(),
            player2: self.player2.clone(),
            current_turn: self.current_turn,
            is_game_over: self.is_game_over,
            winner: self.winner.and_then(|slot| self.player(slot).cloned()),
            phase: self.phase(),
        }
    }

    /// Whether `identity` was seated in this game and its slot is still taken.
    /// A slot is filled at most once per game, so the epoch pins the occupant.
    pub fn holds_seat(&self, identity: &PlayerIdentity) -> bool {
        identity.game_epoch == self.game_epoch
            && Slot::from_id(identity.player_id as i64)
                .and_then(|slot| self.player(slot))
                .is_some()
    }

    pub fn game_epoch(&self) -> u64 {
        self.game_epoch
    }

    pub fn turn(&self) -> Slot {
        self.current_turn
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_game_over {
            return GamePhase::Finished;
        }
        match (&self.player1, &self.player2) {
            (Some(_), Some(_)) => GamePhase::InProgress,
            (None, None) => GamePhase::Empty,
            _ => GamePhase::WaitingForSecond,
        }
    }

    /// Validate and apply a move. `column` is 1-indexed.
    ///
    /// A rejected move leaves every field untouched and reports why in
    /// `MoveOutcome::reason`.
    pub fn attempt_move(&mut self, player_id: i64, column: i64) -> MoveOutcome {
        let (slot, col) = match self.validate_move(player_id, column) {
            Ok(valid) => valid,
            Err(reason) => return self.rejected(player_id, column, reason),
        };

        let Some(row) = self.board.drop_piece(col, slot.piece()) else {
            return self.rejected(player_id, column, MoveError::ColumnFull { column });
        };

        tracing::debug!(
            "Player {} dropped into column {} (row {})",
            slot.id(),
            column,
            row
        );

        if self.board.is_winning_cell(row, col) {
            self.is_game_over = true;
            self.winner = Some(slot);
            tracing::info!("Player {} wins", slot.id());
        } else if self.board.is_full() {
            self.is_game_over = true;
            tracing::info!("Board full, game drawn");
        } else {
            self.current_turn = slot.other();
        }

        MoveOutcome {
            accepted: true,
            state: self.status(),
            reason: None,
        }
    }

    /// Empty board, no players, fresh starting turn
    pub fn reset(&mut self) {
        self.board = Board::new(self.board.rows(), self.board.columns());
        self.player1 = None;
        self.player2 = None;
        self.is_game_over = false;
        self.winner = None;
        self.game_epoch += 1;
        self.current_turn = self.turn_policy.starting_slot();
        tracing::info!(
            "Game reset, player {} will move first",
            self.current_turn.id()
        );
    }

    fn is_ready(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }

    fn player(&self, slot: Slot) -> Option<&Player> {
        match slot {
            Slot::One => self.player1.as_ref(),
            Slot::Two => self.player2.as_ref(),
        }
    }

    /// Checks run in order; the first failure wins
    fn validate_move(&self, player_id: i64, column: i64) -> Result<(Slot, usize), MoveError> {
        if !self.is_ready() {
            return Err(MoveError::NotReady);
        }
        if self.is_game_over {
            return Err(MoveError::GameOver);
        }

        // Once ready both slots are seated, so the slot whose turn it is
        // always belongs to an attached player.
        let slot = match Slot::from_id(player_id) {
            Some(slot) if slot == self.current_turn => slot,
            _ => return Err(MoveError::NotYourTurn { player_id }),
        };

        let columns = self.board.columns();
        if column < 1 || column > columns as i64 {
            return Err(MoveError::ColumnOutOfRange { column, columns });
        }
        let col = (column - 1) as usize;

        if self.board.is_column_full(col) {
            return Err(MoveError::ColumnFull { column });
        }

        Ok((slot, col))
    }

    fn rejected(&self, player_id: i64, column: i64, reason: MoveError) -> MoveOutcome {
        tracing::debug!(
            "Rejected move by player {} into column {}: {}",
            player_id,
            column,
            reason
        );
        MoveOutcome {
            accepted: false,
            state: self.status(),
            reason: Some(reason.to_string()),
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(6, 7, TurnPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn ready_engine() -> GameEngine {
        let mut engine = GameEngine::default();
        engine.register_player("Alice").unwrap();
        engine.register_player("Bob").unwrap();
        engine
    }

    /// Play (player, column) pairs, asserting each is accepted
    fn play(engine: &mut GameEngine, moves: &[(i64, i64)]) -> MoveOutcome {
        let mut last = None;
        for &(player, column) in moves {
            let outcome = engine.attempt_move(player, column);
            assert!(
                outcome.accepted,
                "move ({}, {}) rejected: {:?}",
                player, column, outcome.reason
            );
            last = Some(outcome);
        }
        last.expect("at least one move")
    }

    fn changed_cells(before: &GameState, after: &GameState) -> Vec<(usize, usize)> {
        let mut changed = Vec::new();
        for row in 0..before.rows {
            for col in 0..before.columns {
                if before.board[row][col] != after.board[row][col] {
                    changed.push((row, col));
                }
            }
        }
        changed
    }

    #[test]
    fn test_registration_assigns_slots_in_order() {
        let mut engine = GameEngine::default();
        assert_eq!(engine.phase(), GamePhase::Empty);

        let alice = engine.register_player("Alice").unwrap();
        assert_eq!(alice.player_id, 1);
        assert_eq!(alice.name, "Alice");
        assert_eq!(engine.phase(), GamePhase::WaitingForSecond);

        let bob = engine.register_player("Bob").unwrap();
        assert_eq!(bob.player_id, 2);
        assert_eq!(engine.phase(), GamePhase::InProgress);
    }

    #[test]
    fn test_third_registration_is_rejected() {
        let mut engine = ready_engine();
        let before = engine.status();
        assert_eq!(
            engine.register_player("Carol"),
            Err(GameError::CapacityExceeded)
        );
        assert_eq!(engine.status(), before);
    }

    #[test]
    fn test_move_before_second_player_is_rejected() {
        let mut engine = GameEngine::default();
        engine.register_player("Alice").unwrap();
        let outcome = engine.attempt_move(1, 4);
        assert!(!outcome.accepted);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("game is not ready: waiting for a second player")
        );
    }

    #[test]
    fn test_wrong_turn_is_rejected_without_changes() {
        let mut engine = ready_engine();
        assert_eq!(engine.turn(), Slot::One);
        let before = engine.status();

        let outcome = engine.attempt_move(2, 3);
        assert!(!outcome.accepted);
        assert_eq!(outcome.state, before);
        assert_eq!(engine.status(), before);
    }

    #[test]
    fn test_unknown_player_id_is_rejected() {
        let mut engine = ready_engine();
        for player_id in [0, 3, -1] {
            let outcome = engine.attempt_move(player_id, 1);
            assert!(!outcome.accepted);
            assert_eq!(
                outcome.reason,
                Some(format!("it is not player {}'s turn", player_id))
            );
        }
    }

    #[test]
    fn test_turn_slot_is_seated_whenever_moves_are_validated() {
        for first in [Slot::One, Slot::Two] {
            let mut engine = GameEngine::new(6, 7, TurnPolicy::fixed(first));

            // Only the second slot is empty: both ids stop at "not ready"
            engine.register_player("Alice").unwrap();
            for player_id in [1, 2] {
                let outcome = engine.attempt_move(player_id, 1);
                assert_eq!(
                    outcome.reason.as_deref(),
                    Some("game is not ready: waiting for a second player")
                );
            }

            engine.register_player("Bob").unwrap();
            assert!(engine.player(engine.turn()).is_some());
            assert!(engine.attempt_move(first.id() as i64, 1).accepted);
            assert!(engine.player(engine.turn()).is_some());
        }
    }

    #[test]
    fn test_column_bounds() {
        let mut engine = ready_engine();
        for column in [0, 8, -3] {
            let outcome = engine.attempt_move(1, column);
            assert!(!outcome.accepted, "column {} should be rejected", column);
        }
        assert!(engine.attempt_move(1, 1).accepted);
        assert!(engine.attempt_move(2, 7).accepted);
    }

    #[test]
    fn test_full_column_rejects_extra_drop() {
        let mut engine = ready_engine();
        // Alternate players into column 2: 1,2,1,2,1,2 never forms four vertically
        for i in 0..6 {
            let player = if i % 2 == 0 { 1 } else { 2 };
            let outcome = engine.attempt_move(player, 2);
            assert!(outcome.accepted);
            assert_ne!(outcome.state.board[5 - i][1], Cell::Empty);
        }

        let before = engine.status();
        let outcome = engine.attempt_move(1, 2);
        assert!(!outcome.accepted);
        assert_eq!(outcome.reason.as_deref(), Some("column 2 is full"));
        assert_eq!(engine.status(), before);
    }

    #[test]
    fn test_accepted_move_changes_exactly_one_cell() {
        let mut engine = ready_engine();
        let moves = [(1, 4), (2, 4), (1, 3), (2, 5), (1, 4)];
        for (player, column) in moves {
            let before = engine.status();
            let outcome = engine.attempt_move(player, column);
            assert!(outcome.accepted);

            let changed = changed_cells(&before, &outcome.state);
            assert_eq!(changed.len(), 1);
            let (row, col) = changed[0];
            assert_eq!(before.board[row][col], Cell::Empty);
            let slot = Slot::from_id(player).unwrap();
            assert_eq!(outcome.state.board[row][col], slot.piece());
            assert_eq!(outcome.state.current_turn, slot.other());
        }
    }

    #[test]
    fn test_vertical_win_in_column_four() {
        let mut engine = ready_engine();
        let outcome = play(
            &mut engine,
            &[(1, 4), (2, 1), (1, 4), (2, 1), (1, 4), (2, 1), (1, 4)],
        );

        assert!(outcome.state.is_game_over);
        assert_eq!(outcome.state.phase, GamePhase::Finished);
        let winner = outcome.state.winner.unwrap();
        assert_eq!(winner.player_id, Slot::One);
        assert_eq!(winner.name, "Alice");
    }

    #[test]
    fn test_horizontal_win_completed_in_the_middle() {
        let mut engine = ready_engine();
        // Player 1 fills columns 1, 2, 4 then closes the gap at 3
        let outcome = play(
            &mut engine,
            &[(1, 1), (2, 1), (1, 2), (2, 2), (1, 4), (2, 4), (1, 3)],
        );
        assert!(outcome.state.is_game_over);
        assert_eq!(outcome.state.winner.unwrap().player_id, Slot::One);
    }

    #[test]
    fn test_diagonal_win_for_player_two() {
        let mut engine = ready_engine();
        // Player 2 builds (5,6) (4,5) (3,4) (2,3) in 0-indexed rows/cols
        let outcome = play(
            &mut engine,
            &[
                (1, 6),
                (2, 7),
                (1, 5),
                (2, 6),
                (1, 5),
                (2, 5),
                (1, 4),
                (2, 4),
                (1, 4),
                (2, 4),
            ],
        );
        assert!(outcome.state.is_game_over);
        assert_eq!(outcome.state.winner.unwrap().player_id, Slot::Two);
    }

    #[test]
    fn test_moves_after_game_over_are_rejected() {
        let mut engine = ready_engine();
        play(
            &mut engine,
            &[(1, 4), (2, 1), (1, 4), (2, 1), (1, 4), (2, 1), (1, 4)],
        );
        let before = engine.status();
        let outcome = engine.attempt_move(2, 2);
        assert!(!outcome.accepted);
        assert_eq!(outcome.reason.as_deref(), Some("game is already over"));
        assert_eq!(engine.status(), before);
    }

    #[test]
    fn test_draw_on_full_board_without_line() {
        // 4x4 board filled column pairs in a pattern that never lines up four
        let mut engine = GameEngine::new(4, 4, TurnPolicy::default());
        engine.register_player("Alice").unwrap();
        engine.register_player("Bob").unwrap();

        // Columns bottom-up: 1122, 2211, 1122, 2211
        let outcome = play(
            &mut engine,
            &[
                (1, 1),
                (2, 2),
                (1, 1),
                (2, 2),
                (1, 2),
                (2, 1),
                (1, 2),
                (2, 1),
                (1, 3),
                (2, 4),
                (1, 3),
                (2, 4),
                (1, 4),
                (2, 3),
                (1, 4),
                (2, 3),
            ],
        );
        assert!(outcome.state.is_game_over);
        assert!(outcome.state.winner.is_none());
        assert_eq!(outcome.state.phase, GamePhase::Finished);
    }

    #[test]
    fn test_win_on_last_cell_beats_draw() {
        // 4x4 board where the sixteenth piece completes the top row
        let mut engine = GameEngine::new(4, 4, TurnPolicy::default());
        engine.register_player("Alice").unwrap();
        engine.register_player("Bob").unwrap();

        let outcome = play(
            &mut engine,
            &[
                (1, 4),
                (2, 2),
                (1, 4),
                (2, 4),
                (1, 1),
                (2, 4),
                (1, 1),
                (2, 1),
                (1, 2),
                (2, 1),
                (1, 2),
                (2, 2),
                (1, 3),
                (2, 3),
                (1, 3),
                (2, 3),
            ],
        );
        assert!(outcome.state.board.iter().flatten().all(|&c| c != Cell::Empty));
        assert!(outcome.state.is_game_over);
        assert_eq!(outcome.state.winner.unwrap().player_id, Slot::Two);
    }

    #[test]
    fn test_registration_after_finished_game_resets_board() {
        let mut engine = ready_engine();
        play(
            &mut engine,
            &[(1, 4), (2, 1), (1, 4), (2, 1), (1, 4), (2, 1), (1, 4)],
        );

        let carol = engine.register_player("Carol").unwrap();
        assert_eq!(carol.player_id, 1);

        let state = engine.status();
        assert_eq!(state.board, GameEngine::default().status().board);
        assert!(!state.is_game_over);
        assert!(state.winner.is_none());
        assert_eq!(state.player1.unwrap().name, "Carol");
        assert!(state.player2.is_none());
    }

    #[test]
    fn test_abandon_clears_everything() {
        let mut engine = ready_engine();
        engine.attempt_move(1, 4);

        let identity = engine.abandon();
        assert!(identity.is_empty());

        let state = engine.status();
        assert_eq!(state.phase, GamePhase::Empty);
        assert!(state.player1.is_none() && state.player2.is_none());
        assert!(state.board.iter().flatten().all(|&c| c == Cell::Empty));
    }

    #[test]
    fn test_holds_seat() {
        let mut engine = GameEngine::default();
        let alice = engine.register_player("Alice").unwrap();
        assert!(engine.holds_seat(&alice));
        assert!(!engine.holds_seat(&PlayerIdentity::empty()));

        engine.abandon();
        assert!(!engine.holds_seat(&alice));

        // Someone else now holds slot 1
        engine.register_player("Carol").unwrap();
        assert!(!engine.holds_seat(&alice));
    }

    #[test]
    fn test_same_name_in_a_later_game_is_a_different_seat() {
        let mut engine = ready_engine();
        let old_alice = PlayerIdentity {
            player_id: 1,
            name: "Alice".to_string(),
            game_epoch: engine.game_epoch(),
        };
        assert!(engine.holds_seat(&old_alice));

        engine.reset();
        let new_alice = engine.register_player("Alice").unwrap();
        engine.register_player("Zed").unwrap();

        assert_eq!(new_alice.player_id, old_alice.player_id);
        assert_eq!(new_alice.name, old_alice.name);
        assert_ne!(new_alice.game_epoch, old_alice.game_epoch);
        assert!(!engine.holds_seat(&old_alice));
        assert!(engine.holds_seat(&new_alice));
    }

    #[test]
    fn test_seeded_reset_is_deterministic() {
        let mut a = GameEngine::new(6, 7, TurnPolicy::random(Some(9)));
        let mut b = GameEngine::new(6, 7, TurnPolicy::random(Some(9)));
        for _ in 0..8 {
            assert_eq!(a.turn(), b.turn());
            a.reset();
            b.reset();
        }
    }

    #[test]
    fn test_second_slot_can_start() {
        let mut engine = GameEngine::new(6, 7, TurnPolicy::fixed(Slot::Two));
        engine.register_player("Alice").unwrap();
        engine.register_player("Bob").unwrap();
        assert!(!engine.attempt_move(1, 1).accepted);
        assert!(engine.attempt_move(2, 1).accepted);
        assert_eq!(engine.turn(), Slot::One);
    }
}
