//! Enemy behavior variants.
//!
//! Five closed behaviors, dispatched per tick from the actor engine. Each is
//! a pure transformation of one enemy against the borrowed tile view and the
//! player snapshot; none of them allocates or suspends.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tilehopper_physics::tiles::{TileView, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use tilehopper_physics::Facing;

use super::{DyingSpark, Enemy, EnemyState, DEATH_LAST_FRAME};

/// High bit of the behavior byte: the fast modifier.
pub const BEHAVIOR_FAST: u8 = 0x80;

/// Behavior ids at or above this (fast bit masked off) mark unused slots.
pub const BEHAVIOR_UNUSED: u8 = 0x7F;

/// Downward acceleration for gravity-affected enemies, per tick.
pub const ENEMY_GRAVITY: i8 = 2;

/// Downward velocity clamp shared with the player.
pub const ENEMY_TERMINAL_VELOCITY: i8 = 23;

/// Launch velocity of a Leap enemy's jump.
pub const LEAP_VELOCITY: i8 = -7;

/// The five enemy behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum BehaviorKind {
    /// Diagonal bouncing with independent axis velocities.
    Bounce,
    /// Gravity-affected leaps toward the player.
    Leap,
    /// Ground-hugging chase.
    Roll,
    /// Grid-aligned pursuit, horizontal first.
    Seek,
    /// Flees upward while the player faces it, approaches otherwise.
    Shy,
}

impl BehaviorKind {
    /// Decode a raw behavior byte from level data.
    ///
    /// Returns the behavior and the fast-modifier flag, or `None` for unused
    /// or out-of-range ids.
    pub fn from_raw(raw: u8) -> Option<(Self, bool)> {
        let fast = raw & BEHAVIOR_FAST != 0;
        let kind = match raw & !BEHAVIOR_FAST {
            1 => Self::Bounce,
            2 => Self::Leap,
            3 => Self::Roll,
            4 => Self::Seek,
            5 => Self::Shy,
            _ => return None,
        };
        Some((kind, fast))
    }
}

/// Per-tick inputs shared by every behavior.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorCtx<'a, 'b> {
    pub player_x: u8,
    pub player_y: u8,
    pub player_facing: Facing,
    pub camera_x: i16,
    pub tiles: &'a TileView<'b>,
}

pub(crate) fn dispatch(kind: BehaviorKind, enemy: &mut Enemy, ctx: &BehaviorCtx) {
    match kind {
        BehaviorKind::Bounce => bounce(enemy, ctx),
        BehaviorKind::Leap => leap(enemy, ctx),
        BehaviorKind::Roll => roll(enemy, ctx),
        BehaviorKind::Seek => seek(enemy, ctx),
        BehaviorKind::Shy => shy(enemy, ctx),
    }
}

/// Step one unit in the current horizontal direction, reversing on walls
/// (probed two units ahead when moving right, one when moving left) and on
/// the playfield edges. `probe_y` is the collision row; Leap passes its
/// proposed vertical position.
fn horizontal_bounce_step(enemy: &mut Enemy, ctx: &BehaviorCtx, probe_y: u8) {
    if enemy.x_vel > 0 {
        let next_x = enemy.x.wrapping_add(2);
        if ctx.tiles.solid_spanning_rows(next_x, probe_y) {
            enemy.x_vel = -1;
        } else {
            enemy.x = enemy.x.wrapping_add(1);
            if enemy.x as i16 - ctx.camera_x >= PLAYFIELD_WIDTH - 2 {
                enemy.x_vel = -1;
            }
        }
    } else if enemy.x == 0 {
        enemy.x_vel = 1;
    } else {
        let next_x = enemy.x - 1;
        if ctx.tiles.solid_spanning_rows(next_x, probe_y) {
            enemy.x_vel = 1;
        } else {
            enemy.x = next_x;
            if enemy.x as i16 - ctx.camera_x <= 0 {
                enemy.x_vel = 1;
            }
        }
    }
}

/// Independent elastic bouncing on both axes, 1 unit per tick each.
fn bounce(enemy: &mut Enemy, ctx: &BehaviorCtx) {
    if !enemy.advance_throttle() {
        return;
    }

    enemy.facing = if enemy.x_vel > 0 {
        Facing::Right
    } else {
        Facing::Left
    };
    horizontal_bounce_step(enemy, ctx, enemy.y);

    if enemy.y_vel > 0 {
        if enemy.y as i16 >= PLAYFIELD_HEIGHT - 2 {
            enemy.y_vel = -1;
        } else {
            let next_y = enemy.y.wrapping_add(2);
            if ctx.tiles.solid_spanning_columns(enemy.x, next_y) {
                enemy.y_vel = -1;
            } else {
                enemy.y = enemy.y.wrapping_add(1);
                if enemy.y as i16 >= PLAYFIELD_HEIGHT - 2 {
                    enemy.y_vel = -1;
                }
            }
        }
    } else if enemy.y == 0 {
        enemy.y_vel = 1;
    } else {
        let next_y = enemy.y - 1;
        if ctx.tiles.solid_spanning_columns(enemy.x, next_y) {
            enemy.y_vel = 1;
        } else {
            enemy.y = next_y;
            if enemy.y == 0 {
                enemy.y_vel = 1;
            }
        }
    }
}

/// Gravity-affected arc toward the player.
///
/// The vertical update runs every tick; the throttle only gates the
/// horizontal step. Landing snaps to the nearest even unit so the enemy
/// comes to rest tile-aligned.
fn leap(enemy: &mut Enemy, ctx: &BehaviorCtx) {
    let mut proposed_y = enemy.y;

    if enemy.y_vel < 0 {
        // Rising: integrate with an arithmetic shift so -7 still moves a
        // full unit up, and undo the move on a ceiling hit or at the top.
        let delta = enemy.y_vel >> 3;
        let new_y = proposed_y as i16 + delta as i16;
        if new_y >= 0 {
            let target = new_y as u8;
            if !ctx.tiles.solid_spanning_columns(enemy.x, target) {
                proposed_y = target;
            }
        }
    } else if enemy.y_vel > 0 {
        let new_y = proposed_y.wrapping_add((enemy.y_vel >> 3) as u8);
        if new_y as i16 >= PLAYFIELD_HEIGHT - 2 {
            enemy.state = EnemyState::Dying {
                spark: DyingSpark::White,
                frame: DEATH_LAST_FRAME,
            };
            enemy.y = (PLAYFIELD_HEIGHT - 2) as u8;
            return;
        }
        if !ctx.tiles.solid_spanning_columns(enemy.x, new_y.wrapping_add(1)) {
            proposed_y = new_y;
        }
    } else {
        // At rest: leap when there is ground two units below, otherwise
        // start falling (gravity below picks it up).
        if ctx
            .tiles
            .solid_spanning_columns(enemy.x, enemy.y.wrapping_add(2))
        {
            enemy.x_vel = if ctx.player_x >= enemy.x { 1 } else { -1 };
            enemy.y_vel = LEAP_VELOCITY;
            return;
        }
    }

    let new_vel = enemy.y_vel as i16 + ENEMY_GRAVITY as i16;
    enemy.y_vel = if new_vel > ENEMY_TERMINAL_VELOCITY as i16 {
        ENEMY_TERMINAL_VELOCITY
    } else {
        new_vel as i8
    };

    if enemy.advance_throttle() && enemy.x_vel != 0 {
        horizontal_bounce_step(enemy, ctx, proposed_y);
    }

    enemy.y = proposed_y;

    if enemy.y_vel > 0
        && ctx
            .tiles
            .solid_spanning_columns(enemy.x, enemy.y.wrapping_add(3))
    {
        enemy.y = enemy.y.wrapping_add(1) & 0xFE;
        enemy.y_vel = 0;
    }
}

/// Ground-hugging chase: pick a direction toward the player while grounded,
/// fall one unit per tick otherwise.
fn roll(enemy: &mut Enemy, ctx: &BehaviorCtx) {
    if enemy.y_vel > 0 {
        if enemy.y as i16 + 1 >= PLAYFIELD_HEIGHT - 3 {
            enemy.state = EnemyState::Dying {
                spark: DyingSpark::White,
                frame: DEATH_LAST_FRAME,
            };
            enemy.y = (PLAYFIELD_HEIGHT - 2) as u8;
            return;
        }
        enemy.y = enemy.y.wrapping_add(1);
    } else if enemy.x < ctx.player_x {
        enemy.x_vel = 1;
    } else if enemy.x > ctx.player_x {
        enemy.x_vel = -1;
    } else {
        enemy.x_vel = 0;
    }

    if !enemy.advance_throttle() {
        return;
    }

    if enemy.x_vel == 0 {
        enemy.restraint = super::Restraint::MoveThisTick;
        return;
    }

    if enemy.x_vel > 0 {
        let next_x = enemy.x.wrapping_add(2);
        if !ctx.tiles.solid_spanning_rows(next_x, enemy.y) {
            enemy.x = enemy.x.wrapping_add(1);
        }
    } else if enemy.x == 0 {
        enemy.x_vel = 1;
    } else {
        let next_x = enemy.x - 1;
        if !ctx.tiles.solid_spanning_rows(next_x, enemy.y) {
            enemy.x = next_x;
        }
    }

    if !ctx
        .tiles
        .solid_spanning_columns(enemy.x, enemy.y.wrapping_add(3))
    {
        enemy.y_vel = 1;
        return;
    }
    enemy.y_vel = 0;
}

/// Grid-aligned pursuit. Horizontal closing has priority; vertical closing
/// only runs once the x coordinates match. A blocked axis commits the enemy
/// to the opposite direction for its next attempt instead of freezing.
fn seek(enemy: &mut Enemy, ctx: &BehaviorCtx) {
    if !enemy.advance_throttle() {
        return;
    }

    if enemy.x != ctx.player_x {
        if enemy.x < ctx.player_x {
            let next_x = enemy.x.wrapping_add(1);
            if !ctx
                .tiles
                .solid_spanning_rows(next_x.wrapping_add(1), enemy.y)
            {
                enemy.x = next_x;
                enemy.x_vel = 1;
            } else {
                enemy.x_vel = -1;
            }
        } else if enemy.x == 0 {
            enemy.x_vel = 1;
        } else {
            let next_x = enemy.x - 1;
            if !ctx.tiles.solid_spanning_rows(next_x, enemy.y) {
                enemy.x = next_x;
                enemy.x_vel = -1;
            } else {
                enemy.x_vel = 1;
            }
        }

        enemy.facing = if enemy.x_vel < 0 {
            Facing::Left
        } else {
            Facing::Right
        };
        return;
    }

    if enemy.y != ctx.player_y {
        if enemy.y < ctx.player_y {
            let next_y = enemy.y.wrapping_add(1);
            if !ctx
                .tiles
                .solid_spanning_columns(enemy.x, next_y.wrapping_add(1))
            {
                enemy.y = next_y;
                enemy.y_vel = 1;
            } else {
                enemy.y_vel = -1;
            }
        } else {
            let next_y = enemy.y.wrapping_sub(1);
            if !ctx.tiles.solid_spanning_columns(enemy.x, next_y) {
                enemy.y = next_y;
                enemy.y_vel = -1;
            } else {
                enemy.y_vel = 1;
            }
        }
    }

    enemy.facing = if enemy.x_vel < 0 {
        Facing::Left
    } else {
        Facing::Right
    };
}

/// Bounce-style horizontal motion; vertically flees upward whenever the
/// player faces this enemy, and approaches the player's height otherwise.
fn shy(enemy: &mut Enemy, ctx: &BehaviorCtx) {
    if !enemy.advance_throttle() {
        return;
    }

    // Decided from the pre-move position.
    let player_facing_me = (ctx.player_facing == Facing::Right && enemy.x > ctx.player_x)
        || (ctx.player_facing == Facing::Left && enemy.x < ctx.player_x);

    enemy.facing = if enemy.x_vel > 0 {
        Facing::Right
    } else {
        Facing::Left
    };
    horizontal_bounce_step(enemy, ctx, enemy.y);

    if player_facing_me {
        enemy.y_vel = -1;
    } else if enemy.y < ctx.player_y {
        enemy.y_vel = 1;
    } else if enemy.y > ctx.player_y {
        enemy.y_vel = -1;
    } else {
        enemy.y_vel = 0;
    }

    if enemy.y_vel > 0 {
        let next_y = enemy.y.wrapping_add(2);
        if ctx.tiles.solid_spanning_columns(enemy.x, next_y) {
            enemy.y_vel = -1;
        } else {
            enemy.y = enemy.y.wrapping_add(1);
            if enemy.y as i16 >= PLAYFIELD_HEIGHT - 2 {
                enemy.y_vel = -1;
            }
        }
    } else if enemy.y_vel < 0 {
        if enemy.y == 0 {
            enemy.y_vel = 1;
        } else {
            let next_y = enemy.y - 1;
            if ctx.tiles.solid_spanning_columns(enemy.x, next_y) {
                enemy.y_vel = 1;
            } else {
                enemy.y = next_y;
                if enemy.y == 0 {
                    enemy.y_vel = 1;
                }
            }
        }
    }
}
