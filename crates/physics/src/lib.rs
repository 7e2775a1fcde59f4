//! Tilehopper Physics Engine
//!
//! Deterministic tile-grid movement physics for a fixed-tick 2D platformer
//! simulation. All arithmetic is integer fixed-point: positions are 8-bit
//! game units (2 game units per tile edge) and velocities are signed eighths
//! of a game unit per tick, integrated with an arithmetic right shift.
//!
//! # Architecture
//!
//! - **Tiles**: a borrowed, read-only view of the active stage's tile grid
//!   with solidity tests and the straddle-aware collision probes
//! - **Movement**: the player movement state machine (jump charge, gravity,
//!   momentum, camera) driven one tick at a time
//!
//! # Determinism Rules
//!
//! 1. No floats - every quantity is a small integer
//! 2. No randomness and no system time - callers drive ticks explicitly
//! 3. Signed velocity integration uses arithmetic shift (floor division),
//!    never truncation toward zero

pub mod movement;
pub mod tiles;

pub use movement::{
    EdgeEvent, EdgeSide, Facing, JumpTrigger, MoveCommand, MovementConfig, MovementState,
    PlayerController, StageExits,
};
pub use tiles::TileView;
