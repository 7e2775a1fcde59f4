//! Player movement controller.
//!
//! One [`PlayerController::tick`] call advances the player by exactly one
//! simulation tick. The statement order inside the airborne update is
//! load-bearing: the sentinel jump counter, the ceiling debounce and the
//! landing snap all depend on it.

use crate::tiles::{TileView, MAP_WIDTH, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

use super::config::{MovementConfig, MOMENTUM_CAP};
use super::state::{Facing, MoveCommand, MovementState};

/// Which map edge an exit was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Left,
    Right,
}

/// Raised when the player walks past a map edge that has an exit defined.
///
/// The controller does not perform the transition itself; the level
/// collaborator repositions the player and swaps the stage data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub side: EdgeSide,
    pub target_stage: u8,
}

/// Edge exits of the active stage, supplied by the level collaborator.
/// `None` means the edge is a wall: movement past it is refused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageExits {
    pub left: Option<u8>,
    pub right: Option<u8>,
}

/// Drives [`MovementState`] against a borrowed tile grid.
#[derive(Debug, Clone)]
pub struct PlayerController {
    config: MovementConfig,
}

impl PlayerController {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Advance the player by one tick.
    ///
    /// Airborne ticks run the full fall/jump update including momentum-driven
    /// horizontal steps. Grounded ticks recharge the jump counter, detect
    /// walked-off ledges, and take at most one explicit step per held
    /// direction key.
    pub fn tick(
        &self,
        state: &mut MovementState,
        tiles: &TileView,
        cmd: MoveCommand,
        exits: StageExits,
    ) -> Option<EdgeEvent> {
        if state.airborne {
            self.airborne_tick(state, tiles, cmd, exits)
        } else {
            self.grounded_tick(state, tiles, cmd.jump);

            let mut event = None;
            if cmd.left {
                event = self.move_left(state, tiles, exits);
            }
            if cmd.right {
                let right = self.move_right(state, tiles, exits);
                if event.is_none() {
                    event = right;
                }
            }
            event
        }
    }

    /// Falling/jumping update, one call per airborne tick.
    fn airborne_tick(
        &self,
        state: &mut MovementState,
        tiles: &TileView,
        cmd: MoveCommand,
        exits: StageExits,
    ) -> Option<EdgeEvent> {
        // Jump charge. The counter parks at 1 once expired; upward
        // acceleration only applies while it is still counting down and the
        // key is held. Releasing early also drops the ceiling debounce.
        if state.jump_counter > 0 {
            state.jump_counter -= 1;
        }
        if state.jump_counter == 0 {
            state.jump_counter = 1;
            state.ceiling_latch = false;
        } else if cmd.jump {
            state.y_vel -= self.config.jump_acceleration;
        } else {
            state.ceiling_latch = false;
        }

        // Integrate: arithmetic shift floors toward negative infinity, so a
        // velocity of -7 still moves a full unit upward.
        let delta_y = (state.y_vel as i16) >> 3;
        state.y += delta_y;

        if state.ceiling_latch {
            state.y += 1;
            state.ceiling_latch = false;
        }

        // Fell out of the playfield: reset to the safe default. Life loss is
        // the embedder's policy, not handled here.
        if state.y >= PLAYFIELD_HEIGHT - 3 {
            state.y = 1;
            state.y_vel = 0;
            state.airborne = false;
        }

        // Gravity applies after integration, unconditionally.
        state.y_vel += self.config.gravity;
        if state.y_vel > self.config.terminal_velocity {
            state.y_vel = self.config.terminal_velocity;
        }

        // Momentum builds while a direction key is held and always decays by
        // one unit per tick; non-zero momentum drives a wall-checked step.
        if cmd.left {
            state.x_momentum -= 1;
            if state.x_momentum < -MOMENTUM_CAP {
                state.x_momentum = -MOMENTUM_CAP;
            }
        }
        if cmd.right {
            state.x_momentum += 1;
            if state.x_momentum > MOMENTUM_CAP {
                state.x_momentum = MOMENTUM_CAP;
            }
        }

        if state.x_momentum < 0 {
            state.x_momentum += 1;
            if let Some(event) = self.move_left(state, tiles, exits) {
                return Some(event);
            }
        }
        if state.x_momentum > 0 {
            state.x_momentum -= 1;
            if let Some(event) = self.move_right(state, tiles, exits) {
                return Some(event);
            }
        }

        // Ceiling check, only while moving upward.
        if state.y_vel < 0 && tiles.solid_spanning_columns(state.x, state.y_unit()) {
            state.ceiling_latch = true;
            state.y_vel = 0;
        }

        // Ground check, only while moving downward. Landing snaps to the
        // tile boundary and is the single authoritative landing event.
        if state.y_vel > 0 {
            let foot_y = (state.y + 5) as u8;
            if tiles.solid_spanning_columns(state.x, foot_y) {
                let foot_row = foot_y / 2;
                state.y = foot_row as i16 * 2 - 4;
                state.airborne = false;
                state.y_vel = 0;
                state.x_momentum = 0;
            }
        }

        None
    }

    /// Grounded update: recharge the jump counter while the key is released
    /// and start falling when the ground disappears underfoot.
    fn grounded_tick(&self, state: &mut MovementState, tiles: &TileView, jump_held: bool) {
        if !jump_held {
            state.jump_counter = state.jump_power;
        }

        let foot_y = (state.y + 5) as u8;
        if !tiles.solid_spanning_columns(state.x, foot_y) {
            state.airborne = true;
        }
    }

    /// Step one unit left. At the map edge this either hands off to the
    /// level collaborator (exit defined) or zeroes momentum and refuses.
    pub fn move_left(
        &self,
        state: &mut MovementState,
        tiles: &TileView,
        exits: StageExits,
    ) -> Option<EdgeEvent> {
        if state.x == 0 {
            return match exits.left {
                Some(target) => {
                    log::debug!("left edge exit to stage {target}");
                    Some(EdgeEvent {
                        side: EdgeSide::Left,
                        target_stage: target,
                    })
                }
                None => {
                    state.x_momentum = 0;
                    None
                }
            };
        }

        let new_x = state.x - 1;
        let knee_y = (state.y + 3) as u8;
        if tiles.solid_at(new_x, knee_y) {
            state.x_momentum = 0;
            return None;
        }

        state.x = new_x;
        state.facing = Facing::Left;

        let relative_x = state.x as i16 - state.camera_x;
        if state.camera_x > 0 && relative_x < PLAYFIELD_WIDTH / 2 - 2 {
            state.camera_x -= 1;
        }
        None
    }

    /// Step one unit right. The wall check looks one tile further ahead than
    /// the left step does, matching the character's asymmetric hit box.
    pub fn move_right(
        &self,
        state: &mut MovementState,
        tiles: &TileView,
        exits: StageExits,
    ) -> Option<EdgeEvent> {
        if state.x as i16 >= MAP_WIDTH - 2 {
            return match exits.right {
                Some(target) => {
                    log::debug!("right edge exit to stage {target}");
                    Some(EdgeEvent {
                        side: EdgeSide::Right,
                        target_stage: target,
                    })
                }
                None => {
                    state.x_momentum = 0;
                    None
                }
            };
        }

        let new_x = state.x + 1;
        let knee_y = (state.y + 3) as u8;
        if tiles.solid_at(new_x + 1, knee_y) {
            state.x_momentum = 0;
            return None;
        }

        state.x = new_x;
        state.facing = Facing::Right;

        let max_camera_x = MAP_WIDTH - PLAYFIELD_WIDTH;
        let relative_x = state.x as i16 - state.camera_x;
        if state.camera_x < max_camera_x && relative_x > PLAYFIELD_WIDTH / 2 {
            state.camera_x += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::jump::JumpTrigger;
    use crate::tiles::{MAP_HEIGHT_TILES, MAP_WIDTH_TILES};

    const LAST_PASSABLE: u8 = 0x3E;
    const SOLID: u8 = 0x3F;

    /// Ground along tile row 9, walls at tile columns 10 and 30 (rows 5..9),
    /// and a platform along tile row 7 (columns 15..25).
    fn test_grid() -> Vec<u8> {
        let mut tiles = vec![0u8; MAP_WIDTH_TILES * MAP_HEIGHT_TILES];
        for x in 0..MAP_WIDTH_TILES {
            tiles[9 * MAP_WIDTH_TILES + x] = SOLID;
        }
        for y in 5..9 {
            tiles[y * MAP_WIDTH_TILES + 10] = SOLID;
            tiles[y * MAP_WIDTH_TILES + 30] = SOLID;
        }
        for x in 15..25 {
            tiles[7 * MAP_WIDTH_TILES + x] = SOLID;
        }
        tiles
    }

    fn view(tiles: &[u8]) -> TileView<'_> {
        TileView::new(tiles, MAP_WIDTH_TILES, MAP_HEIGHT_TILES, LAST_PASSABLE)
    }

    fn controller() -> PlayerController {
        PlayerController::new(MovementConfig::default())
    }

    /// Run full ticks (jump edge poll plus movement) and return the minimum
    /// y reached before landing again.
    fn jump_apex(jump_power: u8) -> i16 {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut trigger = JumpTrigger::new();
        let mut state = MovementState::new(4, 14);
        state.jump_power = jump_power;
        state.jump_counter = jump_power;

        let mut min_y = state.y;
        for tick in 0..60 {
            let cmd = MoveCommand {
                jump: true,
                ..MoveCommand::default()
            };
            trigger.poll(cmd.jump, &mut state);
            ctl.tick(&mut state, &view, cmd, StageExits::default());
            min_y = min_y.min(state.y);
            if tick > 0 && state.grounded() {
                break;
            }
        }
        assert!(state.grounded(), "jump arc must land again");
        assert_eq!(state.y, 14, "landing snaps back to the standing height");
        min_y
    }

    #[test]
    fn jump_height_is_a_function_of_jump_power() {
        // Heights measured from the standing position at y = 14.
        assert_eq!(14 - jump_apex(4), 7);
        assert_eq!(14 - jump_apex(5), 9);
    }

    #[test]
    fn landing_zeroes_velocity_and_momentum() {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(4, 8);
        state.airborne = true;
        state.y_vel = 8;
        state.x_momentum = 3;

        for _ in 0..20 {
            ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
            if state.grounded() {
                break;
            }
        }
        assert!(state.grounded());
        assert_eq!(state.y, 14);
        assert_eq!(state.y_vel, 0);
        assert_eq!(state.x_momentum, 0);
    }

    #[test]
    fn walking_off_a_ledge_starts_falling() {
        // Stand on the raised platform (tile row 7): its top is y = 14 - 4.
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(34, 10);
        ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
        assert!(state.grounded());

        // One grounded tick just past the platform's left edge (x = 28).
        state.x = 28;
        ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
        assert!(state.airborne);
    }

    #[test]
    fn left_edge_without_exit_refuses_and_zeroes_momentum() {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(0, 14);
        state.x_momentum = -4;

        let event = ctl.move_left(&mut state, &view, StageExits::default());
        assert!(event.is_none());
        assert_eq!(state.x, 0);
        assert_eq!(state.x_momentum, 0);
    }

    #[test]
    fn left_edge_with_exit_hands_off() {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(0, 14);
        let exits = StageExits {
            left: Some(2),
            right: None,
        };

        let event = ctl.move_left(&mut state, &view, exits);
        assert_eq!(
            event,
            Some(EdgeEvent {
                side: EdgeSide::Left,
                target_stage: 2
            })
        );
        // The handoff leaves repositioning to the level collaborator.
        assert_eq!(state.x, 0);
    }

    #[test]
    fn wall_blocks_step_and_zeroes_momentum() {
        // Wall at tile column 10 spans x = 20..=21, y = 10..=17.
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(22, 14);
        state.x_momentum = -5;

        let event = ctl.move_left(&mut state, &view, StageExits::default());
        assert!(event.is_none());
        assert_eq!(state.x, 22, "knee check at x - 1 hits the wall");
        assert_eq!(state.x_momentum, 0);
    }

    #[test]
    fn right_step_checks_one_tile_further_ahead() {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();

        // Wall at x = 20..=21: stepping right from 17 probes x = 19 (clear),
        // stepping right from 18 probes x = 20 (solid).
        let mut state = MovementState::new(17, 14);
        ctl.move_right(&mut state, &view, StageExits::default());
        assert_eq!(state.x, 18);

        ctl.move_right(&mut state, &view, StageExits::default());
        assert_eq!(state.x, 18, "look-ahead refuses two units from the wall");
    }

    #[test]
    fn momentum_decays_toward_zero_without_input() {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(100, 8);
        state.airborne = true;
        state.x_momentum = 3;

        ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
        assert_eq!(state.x_momentum, 2);
        assert_eq!(state.x, 101, "residual momentum still drives the step");

        // Drag drains the rest within two more ticks, then movement stops.
        ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
        ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
        assert_eq!(state.x_momentum, 0);
        assert_eq!(state.x, 103);
        ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
        assert_eq!(state.x, 103);
    }

    #[test]
    fn held_direction_balances_drag_at_one_step_per_tick() {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(100, 2);
        state.airborne = true;
        state.y_vel = -20;

        let cmd = MoveCommand {
            right: true,
            ..MoveCommand::default()
        };
        for _ in 0..4 {
            ctl.tick(&mut state, &view, cmd, StageExits::default());
        }
        // Build +1 then decay -1 each tick: one step per tick, momentum
        // settles back to zero, and the cap is never exceeded.
        assert_eq!(state.x, 104);
        assert_eq!(state.x_momentum, 0);
        assert!(state.x_momentum <= MOMENTUM_CAP);
    }

    #[test]
    fn ceiling_latch_pushes_down_one_unit_then_clears() {
        let tiles = test_grid();
        let view = view(&tiles);
        let ctl = controller();
        let mut state = MovementState::new(4, 10);
        state.airborne = true;
        state.jump_counter = 3;
        state.y_vel = 0;
        state.ceiling_latch = true;

        let cmd = MoveCommand {
            jump: true,
            ..MoveCommand::default()
        };
        ctl.tick(&mut state, &view, cmd, StageExits::default());
        // Ascent moved one unit up, then the latch pushed one unit back down.
        assert_eq!(state.y, 10);
        assert!(!state.ceiling_latch);
    }

    #[test]
    fn ceiling_contact_zeroes_upward_velocity() {
        // A ceiling directly above the player: tile row 4 spans y = 8..=9.
        let mut tiles = test_grid();
        for x in 0..MAP_WIDTH_TILES {
            tiles[4 * MAP_WIDTH_TILES + x] = SOLID;
        }
        let view = view(&tiles);
        let ctl = controller();
        let mut trigger = JumpTrigger::new();
        let mut state = MovementState::new(4, 14);

        let cmd = MoveCommand {
            jump: true,
            ..MoveCommand::default()
        };
        let mut contacted = false;
        for _ in 0..8 {
            trigger.poll(cmd.jump, &mut state);
            ctl.tick(&mut state, &view, cmd, StageExits::default());
            if state.y <= 9 {
                contacted = true;
                assert!(state.y_vel >= 0, "ceiling hit must cancel the ascent");
            }
        }
        assert!(contacted);
        assert!(state.y >= 8, "the player never passes through the ceiling");
    }

    #[test]
    fn falling_out_of_the_playfield_resets_to_safe_default() {
        let tiles = vec![0u8; MAP_WIDTH_TILES * MAP_HEIGHT_TILES];
        let view = TileView::new(&tiles, MAP_WIDTH_TILES, MAP_HEIGHT_TILES, LAST_PASSABLE);
        let ctl = controller();
        let mut state = MovementState::new(4, 14);
        state.airborne = true;
        state.y_vel = 23;

        for _ in 0..4 {
            ctl.tick(&mut state, &view, MoveCommand::default(), StageExits::default());
        }
        assert!(state.y <= 2, "reset puts the player back at the top");
    }

    #[test]
    fn camera_tracks_within_dead_zone() {
        let tiles = vec![0u8; MAP_WIDTH_TILES * MAP_HEIGHT_TILES];
        let mut with_ground = tiles.clone();
        for x in 0..MAP_WIDTH_TILES {
            with_ground[9 * MAP_WIDTH_TILES + x] = SOLID;
        }
        let view = TileView::new(&with_ground, MAP_WIDTH_TILES, MAP_HEIGHT_TILES, LAST_PASSABLE);
        let ctl = controller();
        let mut state = MovementState::new(12, 14);
        assert_eq!(state.camera_x, 0);

        // Walking right past the dead zone drags the camera one unit per step.
        for _ in 0..5 {
            ctl.move_right(&mut state, &view, StageExits::default());
        }
        assert_eq!(state.x, 17);
        assert_eq!(state.camera_x, 5);

        // Walking back left: the camera holds until the player nears its
        // edge, then follows down to the map boundary and stops there.
        for _ in 0..10 {
            ctl.move_left(&mut state, &view, StageExits::default());
        }
        assert_eq!(state.x, 7);
        assert_eq!(state.camera_x, 0);
    }
}
