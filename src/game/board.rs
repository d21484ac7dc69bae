//! Board representation
//!
//! The board is an 8×8 grid of signed piece codes. The sign is the owner
//! (positive for the user, negative for the engine) and the magnitude is the
//! [`PieceKind`]. Zero is an empty cell.

use super::uci::Move;
use bevy::math::Vec3;
use std::fmt;

/// Owner sign of the human player
pub const USER: i8 = 1;
/// Owner sign of the external engine
pub const ENGINE: i8 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum PieceKind {
    King = 1,
    Queen = 2,
    Bishop = 3,
    Knight = 4,
    Rook = 5,
    Pawn = 6,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
        PieceKind::Pawn,
    ];

    /// Kind of a signed piece code, `None` for an empty cell or garbage
    pub fn from_code(code: i8) -> Option<Self> {
        match code.unsigned_abs() {
            1 => Some(PieceKind::King),
            2 => Some(PieceKind::Queen),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Knight),
            5 => Some(PieceKind::Rook),
            6 => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    /// Signed piece code for `sign`'s piece of this kind
    pub fn code(self, sign: i8) -> i8 {
        self as i8 * sign.signum()
    }

    /// Zero-based slot, handy for per-kind tables
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Promotion suffix in UCI notation
    pub fn uci_char(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Rook => 'r',
            PieceKind::Pawn => 'p',
        }
    }

    pub fn from_uci_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(PieceKind::Queen),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            'r' => Some(PieceKind::Rook),
            _ => None,
        }
    }
}

/// Owner of a piece code: [`USER`], [`ENGINE`] or 0 for empty
#[inline]
pub fn owner(code: i8) -> i8 {
    code.signum()
}

/// A board cell, `file` a–h as 0–7 and `rank` 1–8 as 0–7
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub file: u8,
    pub rank: u8,
}

impl Position {
    /// Checked constructor, `None` outside the board
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Neighbouring cell by a signed offset, `None` when it leaves the board
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file as i8 + file_delta;
        let rank = self.rank as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// All 64 cells, rank by rank
    pub fn all() -> impl Iterator<Item = Position> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Position { file, rank }))
    }

    /// World-space point at the centre of the cell, on the board surface
    ///
    /// Files run along -X so the a-file is on the user's left when looking
    /// down +Z from behind rank 1.
    pub fn to_world(self) -> Vec3 {
        Vec3::new(7.0 - self.file as f32, 0.0, self.rank as f32)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::uci::position_to_uci(*self))
    }
}

/// Side effects of applying a move, used for capture and animation bookkeeping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    /// Code of the moving piece before any promotion
    pub piece: i8,
    /// Captured code and the cell it stood on (differs from `mv.to` en passant)
    pub captured: Option<(i8, Position)>,
    /// Rook relocation accompanying a castling king
    pub rook_shift: Option<Move>,
    /// Code placed on `mv.to` when a pawn promoted
    pub promoted_to: Option<i8>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[i8; 8]; 8],
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    pub fn empty() -> Self {
        Self { cells: [[0; 8]; 8] }
    }

    /// Standard opening position, user pieces on ranks 1–2
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (file, kind) in BACK_RANK.iter().enumerate() {
            board.cells[0][file] = kind.code(USER);
            board.cells[1][file] = PieceKind::Pawn.code(USER);
            board.cells[6][file] = PieceKind::Pawn.code(ENGINE);
            board.cells[7][file] = kind.code(ENGINE);
        }
        board
    }

    #[inline]
    pub fn get(&self, pos: Position) -> i8 {
        self.cells[pos.rank as usize][pos.file as usize]
    }

    #[inline]
    pub fn set(&mut self, pos: Position, code: i8) {
        self.cells[pos.rank as usize][pos.file as usize] = code;
    }

    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == 0
    }

    /// Occupied cells with their codes
    pub fn pieces(&self) -> impl Iterator<Item = (Position, i8)> + '_ {
        Position::all()
            .map(|pos| (pos, self.get(pos)))
            .filter(|(_, code)| *code != 0)
    }

    pub fn king_count(&self, sign: i8) -> usize {
        self.pieces()
            .filter(|(_, code)| *code == PieceKind::King.code(sign))
            .count()
    }

    /// Apply `mv` unconditionally
    ///
    /// No legality is checked. Besides relocating the piece this keeps the
    /// board in step with an engine that castles, captures en passant or
    /// promotes.
    pub fn apply_move(&mut self, mv: &Move) -> AppliedMove {
        let piece = self.get(mv.from);
        let sign = owner(piece);
        let kind = PieceKind::from_code(piece);
        let target = self.get(mv.to);
        let mut captured = (target != 0).then_some((target, mv.to));

        if kind == Some(PieceKind::Pawn) && mv.from.file != mv.to.file && target == 0 {
            let bypassed = Position {
                file: mv.to.file,
                rank: mv.from.rank,
            };
            let code = self.get(bypassed);
            if code == PieceKind::Pawn.code(-sign) {
                self.set(bypassed, 0);
                captured = Some((code, bypassed));
            }
        }

        let rook_shift = if kind == Some(PieceKind::King)
            && mv.from.rank == mv.to.rank
            && (mv.to.file as i8 - mv.from.file as i8).abs() == 2
        {
            self.castle_rook(mv, sign)
        } else {
            None
        };

        let promoted_to = (kind == Some(PieceKind::Pawn) && mv.to.rank == last_rank(sign))
            .then(|| mv.promotion.unwrap_or(PieceKind::Queen).code(sign));

        self.set(mv.from, 0);
        self.set(mv.to, promoted_to.unwrap_or(piece));

        AppliedMove {
            mv: *mv,
            piece,
            captured,
            rook_shift,
            promoted_to,
        }
    }

    fn castle_rook(&mut self, king_move: &Move, sign: i8) -> Option<Move> {
        let rank = king_move.from.rank;
        let (rook_file, landing_file) = if king_move.to.file > king_move.from.file {
            (7, king_move.to.file - 1)
        } else {
            (0, king_move.to.file + 1)
        };
        let rook_from = Position::new(rook_file, rank)?;
        let rook_to = Position::new(landing_file, rank)?;

        if self.get(rook_from) != PieceKind::Rook.code(sign) || !self.is_empty(rook_to) {
            return None;
        }
        self.set(rook_to, self.get(rook_from));
        self.set(rook_from, 0);
        Some(Move::new(rook_from, rook_to))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                write!(f, "{:>3}", self.cells[rank][file])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Rank on which `sign`'s pawns promote
pub fn last_rank(sign: i8) -> u8 {
    if sign > 0 {
        7
    } else {
        0
    }
}

/// Rank from which `sign`'s pawns may advance two cells
pub fn pawn_start_rank(sign: i8) -> u8 {
    if sign > 0 {
        1
    } else {
        6
    }
}
