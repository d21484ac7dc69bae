//! Colours shared by meshes and smoke

use bevy::color::Color;

pub const LIGHT_SQUARE: Color = Color::srgb(0.86, 0.82, 0.72);
pub const DARK_SQUARE: Color = Color::srgb(0.35, 0.27, 0.2);
pub const TABLE: Color = Color::srgb(0.12, 0.1, 0.09);
pub const SELECTED: Color = Color::srgb(0.93, 0.8, 0.36);
pub const DESTINATION: Color = Color::srgb(0.48, 0.74, 0.46);
pub const SUGGESTION: Color = Color::srgb(0.5, 0.63, 0.9);

const USER_PIECE: Color = Color::srgb(0.92, 0.9, 0.84);
const ENGINE_PIECE: Color = Color::srgb(0.16, 0.16, 0.18);

/// Piece and smoke colour of a side, by sign of its piece codes
pub fn team_color(sign: i8) -> Color {
    if sign < 0 {
        ENGINE_PIECE
    } else {
        USER_PIECE
    }
}

/// Faint puff kicked up by travelling pieces
pub fn dust_color() -> Color {
    Color::srgba(0.7, 0.68, 0.62, 0.4)
}
