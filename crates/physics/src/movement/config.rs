//! Movement configuration constants.
//!
//! Velocities are in eighths of a game unit per tick; a velocity of 8 moves
//! one game unit per tick.

use serde::{Deserialize, Serialize};

/// Downward acceleration applied every airborne tick.
pub const GRAVITY: i8 = 5;

/// Reduced gravity used by low-gravity stages.
pub const GRAVITY_SPACE: i8 = 3;

/// Maximum downward velocity.
pub const TERMINAL_VELOCITY: i8 = 23;

/// Upward acceleration applied per powered ascent tick.
pub const JUMP_ACCELERATION: i8 = 7;

/// Ticks of powered ascent per jump.
pub const JUMP_POWER_DEFAULT: u8 = 4;

/// Ticks of powered ascent with the boots item.
pub const JUMP_POWER_BOOTS: u8 = 5;

/// Bound on mid-air horizontal momentum, in units per tick of buildup.
pub const MOMENTUM_CAP: i8 = 5;

/// Configuration for player movement physics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Downward acceleration per airborne tick.
    pub gravity: i8,

    /// Downward velocity clamp.
    pub terminal_velocity: i8,

    /// Upward acceleration per powered ascent tick.
    pub jump_acceleration: i8,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            terminal_velocity: TERMINAL_VELOCITY,
            jump_acceleration: JUMP_ACCELERATION,
        }
    }
}

impl MovementConfig {
    /// Preset for low-gravity stages.
    pub fn low_gravity() -> Self {
        Self {
            gravity: GRAVITY_SPACE,
            ..Self::default()
        }
    }
}
