//! System organization using SystemSets
//!
//! Defines the per-frame order of game systems so every stage sees the
//! results of the one before it.
//!
//! # Execution Order
//!
//! 1. **Input** - Pointer observers have recorded selections
//! 2. **Execution** - Advance the turn state machine, query the engine
//! 3. **Simulation** - Age fragments and step the physics world
//! 4. **Effects** - Drain the event queue into physics and smoke
//! 5. **Visual** - Sync transforms, highlights and smoke gizmos

use bevy::prelude::*;

/// System execution order for a game tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum GameSystems {
    /// Input handling
    ///
    /// Systems: deferred selection from pointer clicks
    Input,

    /// Game state execution
    ///
    /// Systems: [`super::systems::advance_game`]
    Execution,

    /// Physics step and fragment expiry
    Simulation,

    /// Event consumption and particle aging
    Effects,

    /// Visual updates
    ///
    /// Systems: piece and fragment transforms, highlights, smoke drawing
    Visual,
}
