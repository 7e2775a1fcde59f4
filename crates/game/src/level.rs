//! Level and stage data model.
//!
//! Stage layout (tile grids, exits, doors, item and enemy spawn tables) is
//! authored outside this core and supplied read-only at stage load. The
//! simulation only interprets it: tile solidity, exit targets, spawn
//! bindings and door geometry.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilehopper_physics::tiles::{MAP_HEIGHT_TILES, MAP_WIDTH_TILES};
use tilehopper_physics::TileView;

/// Enemy slots per stage.
pub const MAX_ENEMIES: usize = 4;

/// Door slots per stage.
pub const MAX_DOORS: usize = 3;

/// Stages per level.
pub const STAGES_PER_LEVEL: usize = 3;

/// Sprite sheet slots per level.
pub const MAX_SPRITES: usize = 4;

/// Errors from the level/stage loading surface.
///
/// Inside the tick path nothing fails; these cover the loader API only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("stage index {0} out of range")]
    InvalidStage(u8),
    #[error("level index {0} out of range")]
    InvalidLevel(u8),
    #[error("tile data has {got} cells, expected {expected}")]
    BadTileData { expected: usize, got: usize },
}

/// Owned tile grid for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TileMap {
    tiles: Vec<u8>,
}

impl TileMap {
    /// An all-passable grid.
    pub fn empty() -> Self {
        Self {
            tiles: vec![0; MAP_WIDTH_TILES * MAP_HEIGHT_TILES],
        }
    }

    /// Build from raw row-major tile data.
    pub fn from_tiles(tiles: Vec<u8>) -> Result<Self, LevelError> {
        let expected = MAP_WIDTH_TILES * MAP_HEIGHT_TILES;
        if tiles.len() != expected {
            return Err(LevelError::BadTileData {
                expected,
                got: tiles.len(),
            });
        }
        Ok(Self { tiles })
    }

    /// Set the tile id at a tile coordinate. No-op out of bounds.
    pub fn set(&mut self, tile_x: usize, tile_y: usize, id: u8) {
        if tile_x < MAP_WIDTH_TILES && tile_y < MAP_HEIGHT_TILES {
            self.tiles[tile_y * MAP_WIDTH_TILES + tile_x] = id;
        }
    }

    /// Borrow a collision view with the given solidity threshold.
    pub fn view(&self, last_passable: u8) -> TileView<'_> {
        TileView::new(&self.tiles, MAP_WIDTH_TILES, MAP_HEIGHT_TILES, last_passable)
    }

    /// The layout used by the movement tests and demos: a ground floor, two
    /// walls and a floating platform.
    pub fn test_field() -> Self {
        let mut map = Self::empty();
        for x in 0..MAP_WIDTH_TILES {
            map.set(x, 9, 0x3F);
        }
        for y in 5..9 {
            map.set(10, y, 0x3F);
            map.set(30, y, 0x3F);
        }
        for x in 15..25 {
            map.set(x, 7, 0x3F);
        }
        map
    }
}

/// How right-facing sprite frames are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum SpriteMirror {
    /// Right-facing frames are mirrored copies of the left-facing ones.
    Mirrored,
    /// Right-facing frames are stored separately in the sheet.
    Separate,
}

/// How a sprite's frames are sequenced over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum AnimationStyle {
    /// 0, 1, 2, 0, 1, 2, ...
    Loop,
    /// 0, 1, 2, 1, 0, 1, 2, 1, ...
    Alternate,
}

/// Descriptor for an enemy sprite sheet. Pixel data lives with the renderer;
/// the simulation only needs the animation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SpriteSheet {
    /// Distinct frames in the sheet.
    pub frames: u8,
    pub mirror: SpriteMirror,
    pub style: AnimationStyle,
}

impl SpriteSheet {
    /// Length of the animation sequence the frame counter wraps at.
    pub fn sequence_len(&self) -> u8 {
        match self.style {
            AnimationStyle::Loop => self.frames,
            AnimationStyle::Alternate => {
                if self.frames < 2 {
                    self.frames
                } else {
                    self.frames * 2 - 2
                }
            }
        }
    }

    /// Map a sequence index to the sheet frame it displays.
    pub fn frame_at(&self, seq_index: u8) -> u8 {
        match self.style {
            AnimationStyle::Loop => seq_index % self.frames.max(1),
            AnimationStyle::Alternate => {
                let len = self.sequence_len().max(1);
                let i = seq_index % len;
                if i < self.frames {
                    i
                } else {
                    // Descending half of the ping-pong.
                    len - i
                }
            }
        }
    }
}

/// A door connecting this stage to another level/stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Door {
    /// Position of the door's left edge, in game units.
    pub x: u8,
    pub y: u8,
    pub target_level: u8,
    pub target_stage: u8,
}

/// Collectible item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[repr(u8)]
pub enum ItemKind {
    Corkscrew = 0,
    DoorKey = 1,
    /// Raises the player's jump power when collected.
    Boots = 2,
    Lantern = 3,
    TeleportWand = 4,
    Gems = 5,
    Crown = 6,
    Gold = 7,
    BlastolaCola = 8,
    Shield = 14,
}

/// An item placed in a stage. Pickup policy belongs to the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Item {
    pub kind: ItemKind,
    /// Position in tile coordinates.
    pub x: u8,
    pub y: u8,
}

/// An enemy spawn record, as authored in level data.
///
/// `behavior` is the raw behavior byte (the high bit is the fast modifier);
/// `sprite` indexes the level's sprite sheet table. Both are validated when
/// the actor engine binds the stage - bad references disable the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct EnemySpawn {
    pub sprite: u8,
    pub behavior: u8,
}

/// One stage: a tile grid plus its exits, doors, item and enemy table.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Stage {
    pub tiles: TileMap,

    /// Target stage when walking off the left map edge; `None` is a wall.
    pub exit_left: Option<u8>,

    /// Target stage when walking off the right map edge.
    pub exit_right: Option<u8>,

    pub doors: Vec<Door>,

    pub item: Option<Item>,

    /// Enemy slot bindings, indexed by slot number.
    pub enemies: [Option<EnemySpawn>; MAX_ENEMIES],
}

impl Stage {
    pub fn new(tiles: TileMap) -> Self {
        Self {
            tiles,
            exit_left: None,
            exit_right: None,
            doors: Vec::new(),
            item: None,
            enemies: [None; MAX_ENEMIES],
        }
    }

    /// Find the door the player is standing in front of, if any.
    ///
    /// Activation geometry: the y coordinate must match exactly and the
    /// player must stand on the door or at most two units to its right.
    pub fn door_at(&self, player_x: u8, player_y: u8) -> Option<&Door> {
        self.doors.iter().take(MAX_DOORS).find(|door| {
            if player_y != door.y {
                return false;
            }
            let offset = player_x as i16 - door.x as i16;
            (0..=2).contains(&offset)
        })
    }
}

/// A complete level: shared tileset threshold, sprite table and three
/// stages. Replaced wholesale on level load, immutable during tick batches.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Level {
    /// Tile ids greater than this are solid.
    pub last_passable: u8,

    /// Sprite sheets referenced by the stages' enemy tables.
    pub sprites: [Option<SpriteSheet>; MAX_SPRITES],

    pub stages: [Stage; STAGES_PER_LEVEL],
}

impl Level {
    pub fn new(last_passable: u8, stages: [Stage; STAGES_PER_LEVEL]) -> Self {
        Self {
            last_passable,
            sprites: [None; MAX_SPRITES],
            stages,
        }
    }

    /// Checked stage accessor.
    pub fn stage(&self, index: u8) -> Result<&Stage, LevelError> {
        self.stages
            .get(index as usize)
            .ok_or(LevelError::InvalidStage(index))
    }

    /// Three copies of the test field, chained by edge exits.
    pub fn test_level() -> Self {
        let mut stages = [
            Stage::new(TileMap::test_field()),
            Stage::new(TileMap::test_field()),
            Stage::new(TileMap::test_field()),
        ];
        stages[0].exit_right = Some(1);
        stages[1].exit_left = Some(0);
        stages[1].exit_right = Some(2);
        stages[2].exit_left = Some(1);
        Self::new(0x3E, stages)
    }
}
