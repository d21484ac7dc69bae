//! Game event mailbox
//!
//! Game logic and physics push events as things happen; the effects stage
//! drains the queue once per frame. A single [`EventQueue`] is owned by the
//! app as a resource and handed to producers and consumers explicitly.

use super::board::Position;
use bevy::math::Vec3;
use bevy::prelude::Resource;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A piece was taken; emitted before the capturing piece overwrites it
    PieceCaptured { piece: i8, position: Position },
    /// A standing piece is travelling, `current` is its world position this frame
    PieceMoving { start: Position, current: Vec3 },
    /// A travelling piece arrived
    PieceStopped { start: Position, end: Position },
    /// A fragment ran out of lifetime where it last lay
    FragmentExpired {
        position: Vec3,
        volume: f32,
        owner_sign: i8,
    },
}

/// FIFO queue of [`GameEvent`]s
#[derive(Resource, Debug, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    /// Remove and return the oldest event
    pub fn poll(&mut self) -> Option<GameEvent> {
        self.events.pop_front()
    }

    /// Poll until empty
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        std::iter::from_fn(move || self.poll())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_is_fifo() {
        let mut queue = EventQueue::default();
        let a = Position::new(0, 0).unwrap();
        let b = Position::new(1, 1).unwrap();

        queue.push(GameEvent::PieceCaptured {
            piece: -6,
            position: a,
        });
        queue.push(GameEvent::PieceStopped { start: a, end: b });
        assert_eq!(queue.len(), 2);

        assert!(matches!(queue.poll(), Some(GameEvent::PieceCaptured { .. })));
        assert!(matches!(queue.poll(), Some(GameEvent::PieceStopped { .. })));
        assert_eq!(queue.poll(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_empties_queue_in_order() {
        let mut queue = EventQueue::default();
        for i in 0..3 {
            queue.push(GameEvent::FragmentExpired {
                position: Vec3::splat(i as f32),
                volume: 0.1,
                owner_sign: -1,
            });
        }

        let xs: Vec<f32> = queue
            .drain()
            .map(|event| match event {
                GameEvent::FragmentExpired { position, .. } => position.x,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert!(queue.is_empty());
    }
}
