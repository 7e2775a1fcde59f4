//! Player movement state and per-tick input command.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::config::JUMP_POWER_DEFAULT;

/// Horizontal facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum Facing {
    Left,
    Right,
}

/// Complete movement state for the player character.
///
/// Positions are game units. `x` stays within the map (edge handling refuses
/// or hands off before it can leave); `y` is signed because a fast ascent can
/// carry the player transiently above the top of the map, where every tile
/// lookup reads as open space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MovementState {
    /// Horizontal position in game units.
    pub x: u8,

    /// Vertical position in game units.
    pub y: i16,

    /// Vertical velocity in eighths of a game unit per tick.
    pub y_vel: i8,

    /// Bounded mid-air horizontal momentum, decays one unit per tick.
    pub x_momentum: i8,

    /// Facing, updated by horizontal steps.
    pub facing: Facing,

    /// True while falling or jumping.
    pub airborne: bool,

    /// Jump charge. Counts down during ascent; parks at the sentinel value 1
    /// once expired so expiry is distinguishable from a fresh reset.
    pub jump_counter: u8,

    /// Ticks of powered ascent granted per jump. Item pickups may raise it.
    pub jump_power: u8,

    /// One-tick debounce after a ceiling hit: the next tick pushes the player
    /// down one unit instead of re-detecting the same ceiling tile.
    pub ceiling_latch: bool,

    /// Camera left edge in game units, clamped to the map.
    pub camera_x: i16,

    /// Respawn checkpoint, updated on stage transitions.
    pub checkpoint_x: u8,
    pub checkpoint_y: u8,
}

impl MovementState {
    /// Create a grounded, fully recharged state at the given position.
    pub fn new(x: u8, y: u8) -> Self {
        Self {
            x,
            y: y as i16,
            y_vel: 0,
            x_momentum: 0,
            facing: Facing::Right,
            airborne: false,
            jump_counter: JUMP_POWER_DEFAULT,
            jump_power: JUMP_POWER_DEFAULT,
            ceiling_latch: false,
            camera_x: 0,
            checkpoint_x: x,
            checkpoint_y: y,
        }
    }

    /// Vertical position as stored in the 8-bit game-unit encoding.
    ///
    /// Transiently negative positions wrap, matching how every tile lookup
    /// and the actor engine consume the coordinate.
    #[inline]
    pub fn y_unit(&self) -> u8 {
        self.y as u8
    }

    #[inline]
    pub fn grounded(&self) -> bool {
        !self.airborne
    }
}

/// Input command for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCommand {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_grounded_and_recharged() {
        let state = MovementState::new(4, 14);
        assert!(state.grounded());
        assert_eq!(state.jump_counter, state.jump_power);
        assert_eq!(state.facing, Facing::Right);
        assert_eq!((state.checkpoint_x, state.checkpoint_y), (4, 14));
    }

    #[test]
    fn negative_y_wraps_in_unit_encoding() {
        let mut state = MovementState::new(0, 0);
        state.y = -2;
        assert_eq!(state.y_unit(), 254);
    }
}
