//! Game simulation - the fixed-tick main loop.
//!
//! This is the deterministic heart of the game. One [`Simulation::tick`]
//! call advances the whole world by one tick: jump edge detection, player
//! motion, then the actor engine, in that order. Rendering runs elsewhere
//! and reads the state between ticks; the [`TickClock`] decouples the two
//! rates.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tilehopper_physics::tiles::{MAP_WIDTH, PLAYFIELD_WIDTH};
use tilehopper_physics::{
    EdgeSide, JumpTrigger, MovementConfig, MovementState, PlayerController, StageExits,
};

use crate::actors::{ActorEngine, Enemy, PlayerView};
use crate::input::PlayerInput;
use crate::level::{Door, Level, LevelError, STAGES_PER_LEVEL};

/// Simulation tick length in microseconds (~18.2 ticks per second, the
/// original PC timer rate).
pub const TICK_MICROS: u64 = 54_925;

/// Most ticks a single [`TickClock::advance`] call will release. Guards
/// against the catch-up spiral after a long stall.
pub const MAX_TICKS_PER_ADVANCE: u32 = 5;

/// Configuration for the simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub movement: MovementConfig,
}

/// A stage transition performed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub side: EdgeSide,
    pub stage: u8,
}

/// Signals raised by one tick, for the embedder's damage/scoring/sound
/// logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickEvents {
    /// An enemy touched the player this tick.
    pub enemy_hit_player: bool,

    /// The player crossed a map edge with an exit defined.
    pub transition: Option<StageTransition>,

    /// The player pressed open while standing in front of this door.
    /// Key checks and the actual door transition belong to the embedder.
    pub door: Option<Door>,
}

/// Everything that changes tick to tick. Snapshotted wholesale for
/// determinism testing and rollback tooling; the level data is not part of
/// it and must match when a snapshot is restored.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct SimState {
    pub frame: u64,
    pub stage: u8,
    pub player: MovementState,
    pub jump: JumpTrigger,
    pub actors: ActorEngine,
}

/// The main simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: SimulationConfig,
    pub level: Level,
    pub state: SimState,
    controller: PlayerController,
}

impl Simulation {
    /// Create a simulation on stage 0 of the given level, with the player
    /// grounded at `spawn`.
    pub fn new(config: SimulationConfig, level: Level, spawn: (u8, u8)) -> Self {
        let mut player = MovementState::new(spawn.0, spawn.1);
        player.camera_x = centered_camera(spawn.0);

        let mut actors = ActorEngine::new();
        actors.bind_stage(&level, 0);

        let controller = PlayerController::new(config.movement);
        Self {
            config,
            level,
            state: SimState {
                frame: 0,
                stage: 0,
                player,
                jump: JumpTrigger::new(),
                actors,
            },
            controller,
        }
    }

    /// A simulation over the built-in test level.
    pub fn test() -> Self {
        Self::new(SimulationConfig::default(), Level::test_level(), (4, 14))
    }

    /// Advance the simulation by one tick with the given input.
    pub fn tick(&mut self, input: PlayerInput) -> TickEvents {
        self.state.frame += 1;
        let mut events = TickEvents::default();

        let cmd = input.to_command();
        self.state.jump.poll(cmd.jump, &mut self.state.player);

        let stage = &self.level.stages[self.state.stage as usize];
        let exits = StageExits {
            left: stage.exit_left,
            right: stage.exit_right,
        };
        let view = stage.tiles.view(self.level.last_passable);

        let edge = self
            .controller
            .tick(&mut self.state.player, &view, cmd, exits);

        if let Some(event) = edge {
            // The movement step handed off at a map edge; the rest of the
            // tick is consumed by the transition.
            if self.enter_stage(event.target_stage, event.side) {
                events.transition = Some(StageTransition {
                    side: event.side,
                    stage: event.target_stage,
                });
            }
            return events;
        }

        let snapshot = PlayerView {
            x: self.state.player.x,
            y: self.state.player.y_unit(),
            facing: self.state.player.facing,
        };
        let camera_x = self.state.player.camera_x;

        let stage = &self.level.stages[self.state.stage as usize];
        let view = stage.tiles.view(self.level.last_passable);
        events.enemy_hit_player = self.state.actors.update(snapshot, &view, camera_x);

        if input.open() {
            if let Some(door) = stage.door_at(snapshot.x, snapshot.y) {
                events.door = Some(*door);
            }
        }

        events
    }

    /// Perform an edge transition: reposition the player at the far edge of
    /// the target stage, update the checkpoint, re-center the camera and
    /// rebind the enemy slots. Invalid targets are refused without touching
    /// any state.
    fn enter_stage(&mut self, target: u8, side: EdgeSide) -> bool {
        if target as usize >= STAGES_PER_LEVEL {
            log::debug!("stage transition refused: target stage {target} out of range");
            return false;
        }

        let player = &mut self.state.player;
        player.y_vel = 0;
        player.x = match side {
            // Walking off the left edge arrives at the far right, and vice
            // versa.
            EdgeSide::Left => (MAP_WIDTH - 2) as u8,
            EdgeSide::Right => 0,
        };
        player.checkpoint_x = player.x;
        player.checkpoint_y = player.y_unit();
        player.camera_x = centered_camera(player.x);

        self.state.stage = target;
        self.state.actors.bind_stage(&self.level, target);
        log::debug!("stage transition: {side:?} edge to stage {target}");
        true
    }

    /// Replace the level wholesale and re-enter at the given stage and
    /// position. Only valid between tick batches.
    pub fn load_level(
        &mut self,
        level: Level,
        stage: u8,
        entry: (u8, u8),
    ) -> Result<(), LevelError> {
        if stage as usize >= STAGES_PER_LEVEL {
            return Err(LevelError::InvalidStage(stage));
        }

        self.level = level;
        self.state.stage = stage;

        let player = &mut self.state.player;
        player.x = entry.0;
        player.y = entry.1 as i16;
        player.y_vel = 0;
        player.x_momentum = 0;
        player.airborne = false;
        player.checkpoint_x = entry.0;
        player.checkpoint_y = entry.1;
        player.camera_x = centered_camera(entry.0);

        self.state.actors.bind_stage(&self.level, stage);
        log::debug!("level loaded, entering stage {stage} at {entry:?}");
        Ok(())
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.state.frame
    }

    #[inline]
    pub fn stage(&self) -> u8 {
        self.state.stage
    }

    /// Player state for the renderer (position, velocity, facing, airborne).
    #[inline]
    pub fn player(&self) -> &MovementState {
        &self.state.player
    }

    /// Enemy slots for the renderer (position, state, frame, facing).
    #[inline]
    pub fn enemies(&self) -> &[Enemy] {
        self.state.actors.enemies()
    }

    /// Serialize the mutable state for rollback/determinism checks.
    pub fn serialize_state(&self) -> Vec<u8> {
        bincode::encode_to_vec(&self.state, bincode::config::standard())
            .expect("serialization should not fail")
    }

    /// Deserialize and restore state. The caller must restore it against
    /// the same level data it was taken with.
    pub fn deserialize_state(&mut self, data: &[u8]) -> Result<(), bincode::error::DecodeError> {
        let (state, _): (SimState, _) =
            bincode::decode_from_slice(data, bincode::config::standard())?;
        self.state = state;
        Ok(())
    }
}

fn centered_camera(x: u8) -> i16 {
    (x as i16 - PLAYFIELD_WIDTH / 2).clamp(0, MAP_WIDTH - PLAYFIELD_WIDTH)
}

/// Fixed-tick accumulator decoupling the simulation rate from the render
/// rate. Feed it elapsed wall-clock time; it releases whole ticks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct TickClock {
    accumulated_micros: u64,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for elapsed time and return the number of whole ticks to
    /// run, at most [`MAX_TICKS_PER_ADVANCE`]. When the cap is hit the
    /// remaining backlog is shed so a stall cannot snowball.
    pub fn advance(&mut self, elapsed_micros: u64) -> u32 {
        self.accumulated_micros = self.accumulated_micros.saturating_add(elapsed_micros);

        let mut ticks = 0;
        while self.accumulated_micros >= TICK_MICROS && ticks < MAX_TICKS_PER_ADVANCE {
            self.accumulated_micros -= TICK_MICROS;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_ADVANCE {
            self.accumulated_micros = self.accumulated_micros.min(TICK_MICROS);
        }
        ticks
    }
}
