//! Tilehopper Game Core
//!
//! The deterministic simulation core of a tile-based 2D platformer: the
//! player movement engine and the enemy AI/lifecycle engine, ticked at a
//! fixed rate independent of rendering.
//!
//! ```text
//! input ──► player motion ──► (player snapshot) ──► actor engine ──► events
//!                 │                                      │
//!                 └──────── borrowed tile view ──────────┘
//! ```
//!
//! Rendering, audio, asset loading and the windowing loop live outside this
//! crate; they consume read-only state between ticks.
//!
//! # Determinism Rules
//!
//! 1. Integer arithmetic only - positions and velocities are small ints
//! 2. No randomness - spawn variety comes from deterministic cycles
//! 3. Fixed iteration order - enemy slots update by ascending index
//! 4. No I/O and no clocks inside a tick - callers drive [`TickClock`]

pub mod actors;
pub mod input;
pub mod level;
pub mod simulation;

// Re-export main types
pub use actors::{ActorEngine, BehaviorKind, Enemy, EnemyState};
pub use input::PlayerInput;
pub use level::{Level, LevelError, Stage, TileMap};
pub use simulation::{Simulation, SimulationConfig, TickClock, TickEvents};

// Re-export physics types for convenience
pub use tilehopper_physics::{
    EdgeSide, Facing, JumpTrigger, MoveCommand, MovementConfig, MovementState, PlayerController,
    TileView,
};
