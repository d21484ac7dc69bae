//! Turn sequencing between the user and the engine
//!
//! [`ChessGame`] is the only writer of the board. Input only records
//! selections; everything else happens in [`ChessGame::advance`], called once
//! per tick:
//!
//! ```text
//! UserTurn --user move--> Waiting --dwell elapsed--> EngineTurn --reply--> UserTurn
//! ```

use super::animation::MoveAnimator;
use super::board::{last_rank, owner, Board, PieceKind, Position, ENGINE, USER};
use super::error::{GameError, GameResult};
use super::events::{EventQueue, GameEvent};
use super::rules::legal_destinations;
use super::uci::Move;
use crate::engine::EngineSession;
use bevy::prelude::*;

/// Pause between the user's move and the engine query
pub const DEFAULT_DWELL_SECONDS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Phase {
    /// Accepting selections from the user
    #[default]
    UserTurn,
    /// Short pause so the user's move is visible before the engine answers
    Waiting,
    /// Querying the engine and applying its reply
    EngineTurn,
}

#[derive(Resource, Debug)]
pub struct ChessGame {
    board: Board,
    selected: Option<Position>,
    previously_selected: Option<Position>,
    phase: Phase,
    last_move: Option<String>,
    suggestion: Option<Move>,
    dwell: f32,
    dwell_seconds: f32,
    animator: MoveAnimator,
    plies: u32,
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new(DEFAULT_DWELL_SECONDS)
    }
}

impl ChessGame {
    pub fn new(dwell_seconds: f32) -> Self {
        Self::with_board(Board::standard(), dwell_seconds)
    }

    pub fn with_board(board: Board, dwell_seconds: f32) -> Self {
        Self {
            board,
            selected: None,
            previously_selected: None,
            phase: Phase::UserTurn,
            last_move: None,
            suggestion: None,
            dwell: 0.0,
            dwell_seconds,
            animator: MoveAnimator::default(),
            plies: 0,
        }
    }

    /// Record a click; `None` means the user clicked off the board
    ///
    /// Clicks outside [`Phase::UserTurn`] are dropped. Nothing else is
    /// validated here, [`ChessGame::advance`] decides what the pair of
    /// selections means.
    pub fn select_position(&mut self, pos: Option<Position>) {
        if self.phase != Phase::UserTurn {
            debug!("[GAME] Ignoring click during {:?}", self.phase);
            return;
        }
        self.previously_selected = self.selected;
        self.selected = pos;
    }

    /// Run one tick of the turn state machine
    pub fn advance(
        &mut self,
        dt: f32,
        engine: &mut EngineSession,
        events: &mut EventQueue,
    ) -> GameResult<()> {
        self.animator.tick(dt, events);

        match self.phase {
            Phase::UserTurn => self.user_turn(events),
            Phase::Waiting => {
                self.dwell += dt;
                // The engine may answer by capturing the piece that just
                // moved, so its body has to be re-keyed first
                if self.dwell >= self.dwell_seconds && !self.animator.is_animating() {
                    self.phase = Phase::EngineTurn;
                }
            }
            Phase::EngineTurn => self.engine_turn(engine, events)?,
        }
        Ok(())
    }

    fn user_turn(&mut self, events: &mut EventQueue) {
        // Let the previous move land first so moving bodies stay keyed correctly
        if self.animator.is_animating() {
            return;
        }
        let (Some(from), Some(to)) = (self.previously_selected, self.selected) else {
            return;
        };

        if from == to {
            debug!("[GAME] {} clicked twice, deselecting", from);
            self.clear_selection();
            return;
        }
        // Engine piece or empty cell as source, or own piece as target: the
        // click is just a new selection
        if owner(self.board.get(from)) != USER || owner(self.board.get(to)) == USER {
            return;
        }

        let mut mv = Move::new(from, to);
        if PieceKind::from_code(self.board.get(from)) == Some(PieceKind::Pawn)
            && to.rank == last_rank(USER)
        {
            mv.promotion = Some(PieceKind::Queen);
        }

        let uci = mv.to_uci();
        info!("[GAME] User plays {}", uci);
        self.apply(&mv, events);
        self.last_move = Some(uci);
        self.suggestion = None;
        self.clear_selection();
        self.dwell = 0.0;
        self.phase = Phase::Waiting;
    }

    fn engine_turn(
        &mut self,
        engine: &mut EngineSession,
        events: &mut EventQueue,
    ) -> GameResult<()> {
        let Some(user_move) = self.last_move.clone() else {
            // Nothing to answer; only reachable if a caller forces the phase
            warn!("[GAME] Engine turn without a user move, returning to user");
            self.phase = Phase::UserTurn;
            return Ok(());
        };

        let reply = engine.query_next_move(&user_move)?;
        let mv = Move::from_uci(&reply.best_move)?;

        let source = self.board.get(mv.from);
        if owner(source) != ENGINE {
            let reason = if source == 0 {
                format!("{} is empty", mv.from)
            } else {
                format!("{} holds a user piece", mv.from)
            };
            error!("[GAME] Illegal engine move {}: {}", reply.best_move, reason);
            return Err(GameError::IllegalEngineMove {
                mv: reply.best_move,
                reason,
            });
        }

        info!("[GAME] Engine plays {}", mv);
        self.apply(&mv, events);
        self.suggestion = match reply.ponder.as_deref().map(Move::from_uci) {
            Some(Ok(suggestion)) => Some(suggestion),
            Some(Err(e)) => {
                warn!("[GAME] Ignoring unreadable ponder move: {}", e);
                None
            }
            None => None,
        };
        self.phase = Phase::UserTurn;
        Ok(())
    }

    /// Apply `mv` to the board, announce captures and start animations
    fn apply(&mut self, mv: &Move, events: &mut EventQueue) {
        let applied = self.board.apply_move(mv);

        if let Some((piece, position)) = applied.captured {
            debug!("[GAME] {} captured on {}", piece, position);
            events.push(GameEvent::PieceCaptured { piece, position });
        }
        self.animator.start(mv);
        if let Some(rook) = &applied.rook_shift {
            self.animator.start(rook);
        }
        self.plies += 1;
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.previously_selected = None;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current and previous selection
    pub fn selection(&self) -> (Option<Position>, Option<Position>) {
        (self.selected, self.previously_selected)
    }

    /// Cells to highlight for the currently selected user piece
    pub fn highlighted_destinations(&self) -> Vec<Position> {
        match self.selected {
            Some(pos) if owner(self.board.get(pos)) == USER => {
                legal_destinations(&self.board, pos)
            }
            _ => Vec::new(),
        }
    }

    /// The engine's expected reply to its own last move
    pub fn suggested_move(&self) -> Option<Move> {
        self.suggestion
    }

    pub fn last_move(&self) -> Option<&str> {
        self.last_move.as_deref()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn plies(&self) -> u32 {
        self.plies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, ScriptedChannel};

    fn pos(file: u8, rank: u8) -> Position {
        Position::new(file, rank).unwrap()
    }

    fn engine_replying(moves: &[&str]) -> EngineSession {
        let mut channel = ScriptedChannel::ready().greeting("Scripted");
        for reply in moves {
            channel = channel.on("go", &[reply]);
        }
        EngineSession::with_channel(Box::new(channel), 5).unwrap()
    }

    /// Select `from` then `to` and tick once
    fn play(
        game: &mut ChessGame,
        engine: &mut EngineSession,
        events: &mut EventQueue,
        from: Position,
        to: Position,
    ) {
        game.select_position(Some(from));
        game.advance(0.0, engine, events).unwrap();
        game.select_position(Some(to));
        game.advance(0.0, engine, events).unwrap();
    }

    fn changed_cells(before: &Board, after: &Board) -> Vec<Position> {
        Position::all()
            .filter(|&p| before.get(p) != after.get(p))
            .collect()
    }

    /// Tick until animations settle and the dwell elapses
    fn settle(game: &mut ChessGame, engine: &mut EngineSession, events: &mut EventQueue) {
        for _ in 0..20 {
            game.advance(0.1, engine, events).unwrap();
        }
    }

    /// Tick until the engine is about to be queried
    fn reach_engine_turn(game: &mut ChessGame, engine: &mut EngineSession, events: &mut EventQueue) {
        for _ in 0..50 {
            if game.phase() == Phase::EngineTurn {
                return;
            }
            game.advance(0.1, engine, events).unwrap();
        }
        panic!("engine turn never reached, stuck in {:?}", game.phase());
    }

    #[test]
    fn test_pawn_single_step_mutates_only_source_and_destination() {
        let mut game = ChessGame::default();
        let mut engine = engine_replying(&[]);
        let mut events = EventQueue::default();

        for file in 0..8 {
            let mut game_for_file = ChessGame::default();
            let before = *game_for_file.board();
            play(&mut game_for_file, &mut engine, &mut events, pos(file, 1), pos(file, 2));

            let after = *game_for_file.board();
            assert_eq!(changed_cells(&before, &after), vec![pos(file, 1), pos(file, 2)]);
            assert_eq!(after.get(pos(file, 1)), 0);
            assert_eq!(after.get(pos(file, 2)), PieceKind::Pawn.code(USER));
            assert_eq!(game_for_file.phase(), Phase::Waiting);
        }

        // Untouched game stays in user turn
        game.advance(0.1, &mut engine, &mut events).unwrap();
        assert_eq!(game.phase(), Phase::UserTurn);
    }

    #[test]
    fn test_knight_jumps_relocate_only_the_knight() {
        for target in [pos(2, 2), pos(0, 2)] {
            let mut game = ChessGame::default();
            let mut engine = engine_replying(&[]);
            let mut events = EventQueue::default();
            let before = *game.board();

            play(&mut game, &mut engine, &mut events, pos(1, 0), target);

            let after = *game.board();
            assert!(after.is_empty(pos(1, 0)));
            assert_eq!(after.get(target), PieceKind::Knight.code(USER));
            let mut changed = changed_cells(&before, &after);
            changed.sort();
            let mut expected = vec![pos(1, 0), target];
            expected.sort();
            assert_eq!(changed, expected);
            assert_eq!(game.last_move(), Some(if target == pos(2, 2) { "b1c3" } else { "b1a3" }));
        }
    }

    #[test]
    fn test_selecting_engine_piece_never_mutates_board() {
        let mut game = ChessGame::default();
        let mut engine = engine_replying(&[]);
        let mut events = EventQueue::default();
        let before = *game.board();

        play(&mut game, &mut engine, &mut events, pos(4, 6), pos(4, 4));

        assert_eq!(*game.board(), before);
        assert_eq!(game.phase(), Phase::UserTurn);
        assert!(events.is_empty());
    }

    #[test]
    fn test_selecting_nothing_clears_pending_move() {
        let mut game = ChessGame::default();
        let mut engine = engine_replying(&[]);
        let mut events = EventQueue::default();
        let before = *game.board();

        game.select_position(Some(pos(4, 1)));
        game.advance(0.0, &mut engine, &mut events).unwrap();
        game.select_position(None);
        game.advance(0.0, &mut engine, &mut events).unwrap();
        assert_eq!(*game.board(), before);

        // The next click starts a fresh pair instead of completing e2-e3
        game.select_position(Some(pos(4, 2)));
        game.advance(0.0, &mut engine, &mut events).unwrap();
        assert_eq!(*game.board(), before);
        assert_eq!(game.phase(), Phase::UserTurn);
    }

    #[test]
    fn test_clicking_same_square_twice_deselects() {
        let mut game = ChessGame::default();
        let mut engine = engine_replying(&[]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 1));
        assert_eq!(game.selection(), (None, None));
        assert_eq!(*game.board(), Board::standard());
    }

    #[test]
    fn test_own_piece_as_target_reselects() {
        let mut game = ChessGame::default();
        let mut engine = engine_replying(&[]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(3, 1));
        assert_eq!(*game.board(), Board::standard());
        assert_eq!(game.highlighted_destinations().len(), 2);
    }

    #[test]
    fn test_full_turn_cycle_applies_engine_reply() {
        let mut game = ChessGame::default();
        let mut engine = engine_replying(&["bestmove e7e5 ponder g1f3"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 3));
        assert_eq!(game.phase(), Phase::Waiting);

        settle(&mut game, &mut engine, &mut events);
        assert_eq!(game.phase(), Phase::UserTurn);
        assert_eq!(game.board().get(pos(4, 4)), PieceKind::Pawn.code(ENGINE));
        assert!(game.board().is_empty(pos(4, 6)));
        assert_eq!(game.suggested_move(), Some(Move::from_uci("g1f3").unwrap()));
        assert_eq!(engine.history(), ["e2e4", "e7e5"]);
        assert_eq!(game.plies(), 2);
    }

    #[test]
    fn test_waiting_holds_until_dwell_elapses() {
        let mut game = ChessGame::new(1.0);
        let mut engine = engine_replying(&["bestmove e7e5"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 3));
        game.advance(0.5, &mut engine, &mut events).unwrap();
        assert_eq!(game.phase(), Phase::Waiting);
        game.advance(0.5, &mut engine, &mut events).unwrap();
        assert_eq!(game.phase(), Phase::EngineTurn);
        game.advance(0.0, &mut engine, &mut events).unwrap();
        assert_eq!(game.phase(), Phase::UserTurn);
    }

    #[test]
    fn test_engine_capture_emits_event_before_overwrite() {
        let mut board = Board::empty();
        board.set(pos(4, 0), PieceKind::King.code(USER));
        board.set(pos(4, 7), PieceKind::King.code(ENGINE));
        board.set(pos(0, 1), PieceKind::Pawn.code(USER));
        board.set(pos(3, 3), PieceKind::Knight.code(USER));
        board.set(pos(3, 7), PieceKind::Queen.code(ENGINE));

        let mut game = ChessGame::with_board(board, 0.0);
        let mut engine = engine_replying(&["bestmove d8d4"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(0, 1), pos(0, 2));
        while game.phase() != Phase::UserTurn || game.is_animating() {
            game.advance(0.1, &mut engine, &mut events).unwrap();
        }

        let captures: Vec<GameEvent> = events
            .drain()
            .filter(|e| matches!(e, GameEvent::PieceCaptured { .. }))
            .collect();
        assert_eq!(
            captures,
            vec![GameEvent::PieceCaptured {
                piece: PieceKind::Knight.code(USER),
                position: pos(3, 3),
            }]
        );
        assert_eq!(game.board().get(pos(3, 3)), PieceKind::Queen.code(ENGINE));
    }

    #[test]
    fn test_engine_moving_user_piece_is_fatal() {
        let mut game = ChessGame::new(0.0);
        let mut engine = engine_replying(&["bestmove d2d4"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 3));
        reach_engine_turn(&mut game, &mut engine, &mut events);

        let result = game.advance(0.0, &mut engine, &mut events);
        assert!(matches!(result, Err(GameError::IllegalEngineMove { .. })));
        assert_eq!(game.board().get(pos(3, 1)), PieceKind::Pawn.code(USER));
    }

    #[test]
    fn test_engine_moving_from_empty_square_is_fatal() {
        let mut game = ChessGame::new(0.0);
        let mut engine = engine_replying(&["bestmove e5e4"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(3, 1), pos(3, 3));
        reach_engine_turn(&mut game, &mut engine, &mut events);
        assert!(matches!(
            game.advance(0.0, &mut engine, &mut events),
            Err(GameError::IllegalEngineMove { .. })
        ));
    }

    #[test]
    fn test_engine_protocol_failure_propagates() {
        let mut game = ChessGame::new(0.0);
        let mut engine = engine_replying(&["bestmove (none)"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 3));
        reach_engine_turn(&mut game, &mut engine, &mut events);
        assert!(matches!(
            game.advance(0.0, &mut engine, &mut events),
            Err(GameError::Engine(EngineError::Protocol { .. }))
        ));
    }

    #[test]
    fn test_user_promotion_sends_queen_suffix() {
        let mut board = Board::empty();
        board.set(pos(4, 0), PieceKind::King.code(USER));
        board.set(pos(7, 7), PieceKind::King.code(ENGINE));
        board.set(pos(0, 6), PieceKind::Pawn.code(USER));
        let mut game = ChessGame::with_board(board, 0.0);
        let mut engine = engine_replying(&[]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(0, 6), pos(0, 7));
        assert_eq!(game.last_move(), Some("a7a8q"));
        assert_eq!(game.board().get(pos(0, 7)), PieceKind::Queen.code(USER));
    }

    #[test]
    fn test_user_cannot_move_while_previous_move_animates() {
        let mut game = ChessGame::new(0.0);
        let mut engine = engine_replying(&["bestmove e7e5", "bestmove b8c6"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 3));
        reach_engine_turn(&mut game, &mut engine, &mut events);
        game.advance(0.0, &mut engine, &mut events).unwrap();
        assert_eq!(game.phase(), Phase::UserTurn);
        assert!(game.is_animating());

        let before = *game.board();
        play(&mut game, &mut engine, &mut events, pos(6, 0), pos(5, 2));
        assert_eq!(*game.board(), before);

        settle(&mut game, &mut engine, &mut events);
        assert_eq!(game.board().get(pos(5, 2)), PieceKind::Knight.code(USER));
    }

    #[test]
    fn test_clicks_outside_user_turn_are_dropped() {
        let mut game = ChessGame::new(1.0);
        let mut engine = engine_replying(&["bestmove e7e5"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 3));
        assert_eq!(game.phase(), Phase::Waiting);

        // d2-d4 clicked while the engine has yet to answer
        game.select_position(Some(pos(3, 1)));
        game.select_position(Some(pos(3, 3)));
        assert_eq!(game.selection(), (None, None));

        for _ in 0..30 {
            game.advance(0.1, &mut engine, &mut events).unwrap();
        }
        assert_eq!(game.phase(), Phase::UserTurn);
        assert!(!game.is_animating());
        assert_eq!(game.board().get(pos(3, 1)), PieceKind::Pawn.code(USER));
        assert!(game.board().is_empty(pos(3, 3)));
        assert_eq!(game.plies(), 2);
        assert_eq!(engine.history(), ["e2e4", "e7e5"]);
    }

    #[test]
    fn test_engine_waits_for_the_user_piece_to_land() {
        let mut game = ChessGame::new(0.0);
        let mut engine = engine_replying(&["bestmove d8e4"]);
        let mut events = EventQueue::default();

        play(&mut game, &mut engine, &mut events, pos(4, 1), pos(4, 3));
        game.advance(0.1, &mut engine, &mut events).unwrap();
        assert_eq!(game.phase(), Phase::Waiting);
        assert!(engine.history().is_empty());

        reach_engine_turn(&mut game, &mut engine, &mut events);
        // The arrival is queued before the capture it makes room for
        let stopped = events
            .drain()
            .filter(|e| matches!(e, GameEvent::PieceStopped { .. }))
            .count();
        assert_eq!(stopped, 1);

        game.advance(0.0, &mut engine, &mut events).unwrap();
        assert_eq!(
            events.poll(),
            Some(GameEvent::PieceCaptured {
                piece: PieceKind::Pawn.code(USER),
                position: pos(4, 3),
            })
        );
        assert_eq!(game.board().get(pos(4, 3)), PieceKind::Queen.code(ENGINE));
    }
}
