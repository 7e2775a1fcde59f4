//! Enemy slots, spawn/despawn lifecycle and per-tick AI dispatch.
//!
//! Up to four enemy slots exist per stage, bound to spawn records from level
//! data. Slots are processed in ascending index order every tick, and at
//! most one slot may leave the despawned state per tick, system-wide. The
//! respawn-delay cycle and the spawn-offset cycle are shared by all slots
//! and survive stage loads.

pub mod behavior;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tilehopper_physics::tiles::{TileView, PLAYFIELD_WIDTH};
use tilehopper_physics::Facing;

use crate::level::{Level, MAX_ENEMIES, MAX_SPRITES};

pub use behavior::{BehaviorCtx, BehaviorKind, BEHAVIOR_FAST, BEHAVIOR_UNUSED};

/// Horizontal distance from the player past which an enemy despawns.
pub const DESPAWN_RADIUS: i16 = 30;

/// Death animations run this many ticks past their entry frame.
pub const DEATH_LAST_FRAME: u8 = 5;

/// Respawn-delay cycle bounds: 20, 40, 60, 80, 100, then wrapping.
pub const RESPAWN_DELAY_MIN: u8 = 20;
pub const RESPAWN_DELAY_MAX: u8 = 100;
pub const RESPAWN_DELAY_STEP: u8 = 20;

/// Retry delay for slots with no usable binding.
const DISABLED_RETRY_DELAY: u8 = 100;

/// Movement throttle. Slow enemies alternate move/skip ticks; the fast
/// modifier bit upgrades a slot to moving every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum Restraint {
    MoveThisTick,
    SkipThisTick,
    EveryTick,
}

/// Which death animation an enemy is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum DyingSpark {
    /// Environmental deaths (falling out of the playfield).
    White,
    /// Player-contact deaths.
    Red,
}

/// Enemy lifecycle state.
///
/// The per-variant counter keeps the respawn timer and the animation frame
/// in the same storage slot: an enemy can count down toward respawn or
/// animate, never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum EnemyState {
    /// Waiting to respawn; the counter is ticks until the next attempt.
    Despawned { respawn_in: u8 },
    /// Alive; the counter is the animation sequence index.
    Active { frame: u8 },
    /// Playing a death animation; despawns once `frame` reaches
    /// [`DEATH_LAST_FRAME`].
    Dying { spark: DyingSpark, frame: u8 },
}

/// One enemy slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Encode, Decode)]
pub struct Enemy {
    pub x: u8,
    pub y: u8,
    pub x_vel: i8,
    pub y_vel: i8,
    pub state: EnemyState,
    pub facing: Facing,
    pub(crate) restraint: Restraint,
    pub(crate) class: Option<EnemyClass>,
    pub(crate) sprite: u8,
    pub(crate) seq_len: u8,
}

/// A slot's parsed behavior binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub(crate) struct EnemyClass {
    pub kind: BehaviorKind,
    pub fast: bool,
}

impl Enemy {
    fn unused() -> Self {
        Self {
            x: 0,
            y: 0,
            x_vel: 0,
            y_vel: 0,
            state: EnemyState::Despawned {
                respawn_in: DISABLED_RETRY_DELAY,
            },
            facing: Facing::Left,
            restraint: Restraint::MoveThisTick,
            class: None,
            sprite: 0,
            seq_len: 0,
        }
    }

    /// Consume one throttle step; returns whether movement runs this tick.
    pub(crate) fn advance_throttle(&mut self) -> bool {
        match self.restraint {
            Restraint::SkipThisTick => {
                self.restraint = Restraint::MoveThisTick;
                false
            }
            Restraint::MoveThisTick => {
                self.restraint = Restraint::SkipThisTick;
                true
            }
            Restraint::EveryTick => true,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, EnemyState::Active { .. })
    }

    /// Sprite table index for the renderer.
    #[inline]
    pub fn sprite_index(&self) -> u8 {
        self.sprite
    }

    /// Animation sequence index while alive.
    pub fn anim_frame(&self) -> Option<u8> {
        match self.state {
            EnemyState::Active { frame } => Some(frame),
            _ => None,
        }
    }

    /// Viewport culling test for the renderer: active and within two units
    /// of the visible playfield.
    pub fn visible(&self, camera_x: i16) -> bool {
        if !self.is_active() {
            return false;
        }
        let x = self.x as i16;
        x >= camera_x - 2 && x < camera_x + PLAYFIELD_WIDTH + 2
    }

    #[cfg(test)]
    pub(crate) fn for_tests(kind: BehaviorKind, fast: bool) -> Self {
        Self {
            state: EnemyState::Active { frame: 0 },
            restraint: if fast {
                Restraint::EveryTick
            } else {
                Restraint::MoveThisTick
            },
            class: Some(EnemyClass { kind, fast }),
            seq_len: 4,
            ..Self::unused()
        }
    }
}

/// Player snapshot consumed by the actor engine each tick.
#[derive(Debug, Clone, Copy)]
pub struct PlayerView {
    pub x: u8,
    pub y: u8,
    pub facing: Facing,
}

/// The enemy AI engine.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct ActorEngine {
    enemies: [Enemy; MAX_ENEMIES],

    /// Spawn-distance cycle, advanced on every spawn attempt. Process-
    /// lifetime state: stage loads intentionally leave it alone so spawn
    /// distances keep varying across transitions.
    spawn_offset: u8,

    /// Shared respawn-delay cycle, advanced when a death animation ends.
    respawn_cycle: u8,
}

impl Default for ActorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorEngine {
    pub fn new() -> Self {
        Self {
            enemies: [Enemy::unused(); MAX_ENEMIES],
            spawn_offset: PLAYFIELD_WIDTH as u8,
            respawn_cycle: RESPAWN_DELAY_MIN,
        }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Bind the slots to a stage's enemy table. Records with out-of-range
    /// behavior or sprite references disable their slot instead of being
    /// read out of bounds.
    pub fn bind_stage(&mut self, level: &Level, stage_index: u8) {
        let Ok(stage) = level.stage(stage_index) else {
            log::warn!("actor bind refused: stage {stage_index} out of range");
            return;
        };

        for (slot, enemy) in self.enemies.iter_mut().enumerate() {
            enemy.class = None;
            enemy.sprite = 0;
            enemy.seq_len = 0;

            let Some(record) = stage.enemies[slot] else {
                continue;
            };
            let Some((kind, fast)) = BehaviorKind::from_raw(record.behavior) else {
                continue;
            };
            if record.sprite as usize >= MAX_SPRITES {
                log::warn!(
                    "enemy slot {slot}: sprite index {} out of range, slot disabled",
                    record.sprite
                );
                continue;
            }
            let Some(sheet) = level.sprites[record.sprite as usize] else {
                log::warn!(
                    "enemy slot {slot}: sprite table entry {} unused, slot disabled",
                    record.sprite
                );
                continue;
            };
            if sheet.sequence_len() == 0 {
                log::warn!("enemy slot {slot}: sprite {} has no frames, slot disabled", record.sprite);
                continue;
            }

            enemy.class = Some(EnemyClass { kind, fast });
            enemy.sprite = record.sprite;
            enemy.seq_len = sheet.sequence_len();
            enemy.x_vel = 0;
            enemy.y_vel = 0;
            enemy.facing = Facing::Left;
            enemy.restraint = Restraint::MoveThisTick;
        }

        self.reset();
    }

    /// Despawn every slot, seeding the respawn timers from the shared cycle.
    pub fn reset(&mut self) {
        let delay = self.respawn_cycle;
        for enemy in &mut self.enemies {
            enemy.state = EnemyState::Despawned { respawn_in: delay };
        }
    }

    /// Advance all enemy slots by one tick.
    ///
    /// Returns true when an enemy touched the player this tick.
    pub fn update(&mut self, player: PlayerView, tiles: &TileView, camera_x: i16) -> bool {
        let mut spawned_this_tick = false;
        let mut hit_player = false;

        for slot in 0..MAX_ENEMIES {
            match self.enemies[slot].state {
                EnemyState::Despawned { respawn_in } => {
                    let remaining = respawn_in.saturating_sub(1);
                    self.enemies[slot].state = EnemyState::Despawned {
                        respawn_in: remaining,
                    };
                    if remaining == 0 {
                        self.try_spawn(slot, player, tiles, camera_x, &mut spawned_this_tick);
                    }
                }

                EnemyState::Dying { frame, .. } if frame >= DEATH_LAST_FRAME => {
                    self.enemies[slot].state = EnemyState::Despawned {
                        respawn_in: self.respawn_cycle,
                    };
                    self.respawn_cycle += RESPAWN_DELAY_STEP;
                    if self.respawn_cycle > RESPAWN_DELAY_MAX {
                        self.respawn_cycle = RESPAWN_DELAY_MIN;
                    }
                }
                EnemyState::Dying { spark, frame } => {
                    self.enemies[slot].state = EnemyState::Dying {
                        spark,
                        frame: frame + 1,
                    };
                }

                EnemyState::Active { frame } => {
                    let respawn_delay = self.respawn_cycle;
                    let enemy = &mut self.enemies[slot];

                    let mut next = frame + 1;
                    if next >= enemy.seq_len {
                        next = 0;
                    }
                    enemy.state = EnemyState::Active { frame: next };

                    if let Some(class) = enemy.class {
                        let ctx = BehaviorCtx {
                            player_x: player.x,
                            player_y: player.y,
                            player_facing: player.facing,
                            camera_x,
                            tiles,
                        };
                        behavior::dispatch(class.kind, enemy, &ctx);
                    }

                    // Despawn by distance: no animation, no cycle advance.
                    let dx = enemy.x as i16 - player.x as i16;
                    if dx < -DESPAWN_RADIUS || dx > DESPAWN_RADIUS {
                        enemy.state = EnemyState::Despawned {
                            respawn_in: respawn_delay,
                        };
                    }

                    // Player contact: the red-spark death animation starts
                    // and the collision signal is raised for this tick.
                    let dx = enemy.x as i16 - player.x as i16;
                    let dy = enemy.y as i16 - player.y as i16;
                    if (-1..=1).contains(&dx) && (0..4).contains(&dy) {
                        enemy.state = EnemyState::Dying {
                            spark: DyingSpark::Red,
                            frame: 0,
                        };
                        hit_player = true;
                    }
                }
            }
        }

        hit_player
    }

    /// Spawn attempt for one slot. At most one attempt per update succeeds.
    fn try_spawn(
        &mut self,
        slot: usize,
        player: PlayerView,
        tiles: &TileView,
        camera_x: i16,
        spawned_this_tick: &mut bool,
    ) {
        if *spawned_this_tick {
            return;
        }

        let Some(class) = self.enemies[slot].class else {
            self.enemies[slot].state = EnemyState::Despawned {
                respawn_in: DISABLED_RETRY_DELAY,
            };
            return;
        };

        // The offset cycles through [PLAYFIELD_WIDTH, PLAYFIELD_WIDTH + 7)
        // in steps of two: spawn distance varies without randomness.
        self.spawn_offset += 2;
        if self.spawn_offset as i16 >= PLAYFIELD_WIDTH + 7 {
            self.spawn_offset = PLAYFIELD_WIDTH as u8;
        }

        let offset = self.spawn_offset as i16;
        let raw_x = if player.facing == Facing::Right {
            camera_x + offset
        } else {
            camera_x - (offset - PLAYFIELD_WIDTH + 2)
        };
        let spawn_x = raw_x.clamp(0, 255) as u8;

        // Probe upward from the player's height for open space.
        let mut spawn_y = player.y;
        for _ in 0..2 {
            if !tiles.solid_at(spawn_x, spawn_y) {
                break;
            }
            spawn_y = spawn_y.wrapping_sub(1);
        }

        *spawned_this_tick = true;
        let enemy = &mut self.enemies[slot];
        enemy.x = spawn_x;
        enemy.y = spawn_y;
        enemy.state = EnemyState::Active { frame: 0 };
        match class.kind {
            BehaviorKind::Bounce | BehaviorKind::Shy => {
                enemy.x_vel = -1;
                enemy.y_vel = -1;
            }
            _ => {
                enemy.x_vel = 0;
                enemy.y_vel = 0;
            }
        }
        enemy.facing = Facing::Left;
        enemy.restraint = if class.fast {
            Restraint::EveryTick
        } else {
            Restraint::MoveThisTick
        };
    }
}
