//! Player movement physics.
//!
//! The movement engine advances the player-character by exactly one
//! simulation tick per call. It owns no level data: the tile grid is
//! borrowed per tick and stage exits are supplied by the level collaborator,
//! which also performs the actual stage swap when an [`EdgeEvent`] is
//! returned.

pub mod config;
pub mod controller;
pub mod jump;
pub mod state;

pub use config::MovementConfig;
pub use controller::{EdgeEvent, EdgeSide, PlayerController, StageExits};
pub use jump::JumpTrigger;
pub use state::{Facing, MoveCommand, MovementState};
