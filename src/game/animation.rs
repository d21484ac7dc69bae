//! Move animations
//!
//! A move is applied to the board instantly; the piece then travels to its
//! destination over [`MOVE_DURATION`] seconds. Each tick reports the piece's
//! interpolated position as [`GameEvent::PieceMoving`] and the arrival as
//! [`GameEvent::PieceStopped`].

use super::board::Position;
use super::events::{EventQueue, GameEvent};
use super::uci::Move;
use bevy::math::Vec3;

/// Seconds a piece takes to travel between cells
pub const MOVE_DURATION: f32 = 0.6;
/// Peak height of the hop in world units
const HOP_HEIGHT: f32 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct MoveAnimation {
    pub start: Position,
    pub end: Position,
    elapsed: f32,
}

impl MoveAnimation {
    fn progress(&self) -> f32 {
        (self.elapsed / MOVE_DURATION).clamp(0.0, 1.0)
    }

    /// Interpolated world position with a small parabolic hop
    pub fn current(&self) -> Vec3 {
        let t = self.progress();
        let flat = self.start.to_world().lerp(self.end.to_world(), t);
        flat + Vec3::Y * HOP_HEIGHT * (std::f32::consts::PI * t).sin()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MoveAnimator {
    active: Vec<MoveAnimation>,
}

impl MoveAnimator {
    pub fn start(&mut self, mv: &Move) {
        self.active.push(MoveAnimation {
            start: mv.from,
            end: mv.to,
            elapsed: 0.0,
        });
    }

    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active(&self) -> &[MoveAnimation] {
        &self.active
    }

    /// Advance every animation by `dt`, reporting positions and arrivals
    pub fn tick(&mut self, dt: f32, events: &mut EventQueue) {
        for animation in &mut self.active {
            animation.elapsed += dt;
            events.push(GameEvent::PieceMoving {
                start: animation.start,
                current: animation.current(),
            });
            if animation.progress() >= 1.0 {
                events.push(GameEvent::PieceStopped {
                    start: animation.start,
                    end: animation.end,
                });
            }
        }
        self.active.retain(|animation| animation.progress() < 1.0);
    }
}
