//! Conversion between board coordinates and UCI notation
//!
//! The one place that knows how `e2` and `e2e4` map onto [`Position`] and
//! [`Move`]. Everything that talks to the engine or logs a move goes through
//! here.

use super::board::{PieceKind, Position};
use super::error::{GameError, GameResult};
use std::fmt;

/// A move between two cells, with the promotion piece when a pawn promotes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Parse `e2e4` or `e7e8q`
    pub fn from_uci(text: &str) -> GameResult<Self> {
        let malformed = || GameError::CoordinateFormat {
            text: text.to_string(),
        };

        let from = uci_to_position(text.get(0..2).ok_or_else(malformed)?)?;
        let to = uci_to_position(text.get(2..4).ok_or_else(malformed)?)?;
        let promotion = match text.get(4..) {
            None | Some("") => None,
            Some(suffix) => {
                let mut chars = suffix.chars();
                match (chars.next().and_then(PieceKind::from_uci_char), chars.next()) {
                    (Some(kind), None) => Some(kind),
                    _ => return Err(malformed()),
                }
            }
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }

    pub fn to_uci(&self) -> String {
        let mut text = position_to_uci(self.from);
        text.push_str(&position_to_uci(self.to));
        if let Some(kind) = self.promotion {
            text.push(kind.uci_char());
        }
        text
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// `(4, 2)` → `"e3"`
pub fn position_to_uci(pos: Position) -> String {
    let file = (b'a' + pos.file) as char;
    let rank = (b'1' + pos.rank) as char;
    format!("{file}{rank}")
}

/// `"e3"` → `(4, 2)`; anything that is not exactly one board cell is an error
pub fn uci_to_position(text: &str) -> GameResult<Position> {
    let malformed = || GameError::CoordinateFormat {
        text: text.to_string(),
    };

    match text.as_bytes() {
        [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
            Position::new(file - b'a', rank - b'1').ok_or_else(malformed)
        }
        _ => Err(malformed()),
    }
}
