//! Chess piece movement rules
//!
//! Contains the rules for how each chess piece can move.
//! Pure functions with no side effects - easy to test.

use crate::game::board::{owner, pawn_start_rank, Board, PieceKind, Position};

/// Check whether the piece on `from` could move to `to`
pub fn is_reachable(board: &Board, from: Position, to: Position) -> bool {
    // Can't move to the same square
    if from == to {
        return false;
    }

    let piece = board.get(from);
    let Some(kind) = PieceKind::from_code(piece) else {
        return false;
    };
    let sign = owner(piece);

    // Can't capture your own pieces
    if owner(board.get(to)) == sign {
        return false;
    }

    match kind {
        PieceKind::Pawn => is_valid_pawn_move(from, to, sign, board),
        PieceKind::Knight => is_valid_knight_move(from, to),
        PieceKind::Bishop => is_valid_bishop_move(from, to, board),
        PieceKind::Rook => is_valid_rook_move(from, to, board),
        PieceKind::Queen => is_valid_queen_move(from, to, board),
        PieceKind::King => is_valid_king_move(from, to),
    }
}

/// Every cell the piece on `from` could move to, empty for an empty cell
pub fn legal_destinations(board: &Board, from: Position) -> Vec<Position> {
    Position::all()
        .filter(|&to| is_reachable(board, from, to))
        .collect()
}

fn deltas(from: Position, to: Position) -> (i8, i8) {
    (
        to.file as i8 - from.file as i8,
        to.rank as i8 - from.rank as i8,
    )
}

fn is_valid_pawn_move(from: Position, to: Position, sign: i8, board: &Board) -> bool {
    let direction = sign;
    let (dx, dy) = deltas(from, to);

    // Forward move
    if dx == 0 && dy == direction {
        return board.is_empty(to);
    }

    // Double move from starting rank
    if dx == 0 && dy == 2 * direction && from.rank == pawn_start_rank(sign) {
        let intermediate = from.offset(0, direction);
        return intermediate.is_some_and(|cell| board.is_empty(cell)) && board.is_empty(to);
    }

    // Capture diagonally
    if dx.abs() == 1 && dy == direction {
        return owner(board.get(to)) == -sign;
    }

    false
}

fn is_valid_knight_move(from: Position, to: Position) -> bool {
    let (dx, dy) = deltas(from, to);
    let (dx, dy) = (dx.abs(), dy.abs());
    (dx == 2 && dy == 1) || (dx == 1 && dy == 2)
}

fn is_valid_bishop_move(from: Position, to: Position, board: &Board) -> bool {
    let (dx, dy) = deltas(from, to);

    // Must move diagonally
    if dx.abs() != dy.abs() {
        return false;
    }

    is_path_clear(from, to, board)
}

fn is_valid_rook_move(from: Position, to: Position, board: &Board) -> bool {
    // Must move horizontally or vertically
    if from.file != to.file && from.rank != to.rank {
        return false;
    }

    is_path_clear(from, to, board)
}

fn is_valid_queen_move(from: Position, to: Position, board: &Board) -> bool {
    is_valid_rook_move(from, to, board) || is_valid_bishop_move(from, to, board)
}

fn is_valid_king_move(from: Position, to: Position) -> bool {
    let (dx, dy) = deltas(from, to);
    dx.abs() <= 1 && dy.abs() <= 1
}

/// Every cell strictly between `from` and `to` is empty
fn is_path_clear(from: Position, to: Position, board: &Board) -> bool {
    let (dx, dy) = deltas(from, to);
    let (step_x, step_y) = (dx.signum(), dy.signum());

    let mut cursor = from.offset(step_x, step_y);
    while let Some(cell) = cursor {
        if cell == to {
            return true;
        }
        if !board.is_empty(cell) {
            return false;
        }
        cursor = cell.offset(step_x, step_y);
    }

    false
}
