//! Player input for the simulation.
//!
//! Inputs are sampled once per tick by the embedder (keyboard, gamepad) and
//! packed into a bitfield. Edge detection for the jump key happens inside
//! the simulation, not here: this type carries level states only.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tilehopper_physics::MoveCommand;

/// Bitflags for player input state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct PlayerInput {
    /// Raw bitfield of held inputs.
    pub bits: u8,
}

impl PlayerInput {
    pub const LEFT: u8 = 1 << 0;
    pub const RIGHT: u8 = 1 << 1;
    pub const JUMP: u8 = 1 << 2;

    /// Open/use key, consumed by door activation checks.
    pub const OPEN: u8 = 1 << 3;

    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    #[inline]
    pub const fn is_held(&self, input: u8) -> bool {
        self.bits & input != 0
    }

    #[inline]
    pub fn set(&mut self, input: u8, held: bool) {
        if held {
            self.bits |= input;
        } else {
            self.bits &= !input;
        }
    }

    #[inline]
    pub const fn left(&self) -> bool {
        self.is_held(Self::LEFT)
    }

    #[inline]
    pub const fn right(&self) -> bool {
        self.is_held(Self::RIGHT)
    }

    #[inline]
    pub const fn jump(&self) -> bool {
        self.is_held(Self::JUMP)
    }

    #[inline]
    pub const fn open(&self) -> bool {
        self.is_held(Self::OPEN)
    }

    /// Convert to a movement command for the physics controller.
    pub const fn to_command(self) -> MoveCommand {
        MoveCommand {
            left: self.left(),
            right: self.right(),
            jump: self.jump(),
        }
    }
}
