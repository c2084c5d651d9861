use serde::{Deserialize, Serialize};

/// Closed set of voxel types. The discriminant doubles as the stable id used
/// for table lookups and save files.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BlockType {
    #[default]
    Air = 0,
    Dirt = 1,
    Grass = 2,
    Stone = 3,
    Sand = 4,
    Snow = 5,
    Wood = 6,
    WoodLog = 7,
    Leaves = 8,
    Water = 9,
    Wisp = 10,
}

impl BlockType {
    pub const COUNT: usize = 11;

    pub const ALL: [BlockType; Self::COUNT] = [
        BlockType::Air,
        BlockType::Dirt,
        BlockType::Grass,
        BlockType::Stone,
        BlockType::Sand,
        BlockType::Snow,
        BlockType::Wood,
        BlockType::WoodLog,
        BlockType::Leaves,
        BlockType::Water,
        BlockType::Wisp,
    ];

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_id(id: u8) -> Option<BlockType> {
        Self::ALL.get(id as usize).copied()
    }

    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, BlockType::Air)
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Air => "air",
            BlockType::Dirt => "dirt",
            BlockType::Grass => "grass",
            BlockType::Stone => "stone",
            BlockType::Sand => "sand",
            BlockType::Snow => "snow",
            BlockType::Wood => "wood",
            BlockType::WoodLog => "wood_log",
            BlockType::Leaves => "leaves",
            BlockType::Water => "water",
            BlockType::Wisp => "wisp",
        }
    }

    pub fn from_name(name: &str) -> Option<BlockType> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }
}

/// Noise-selected classification controlling the surface stack of a column.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    None,
    Desert,
    Plains,
    Snowlands,
}

impl Biome {
    /// First non-air block of a landmass column.
    pub fn surface_block(self) -> BlockType {
        match self {
            Biome::Desert => BlockType::Sand,
            Biome::Plains | Biome::None => BlockType::Grass,
            Biome::Snowlands => BlockType::Snow,
        }
    }

    /// Blocks directly below the surface, up to the subsurface depth.
    pub fn subsurface_block(self) -> BlockType {
        match self {
            Biome::Desert => BlockType::Sand,
            Biome::Plains | Biome::Snowlands | Biome::None => BlockType::Dirt,
        }
    }
}

// Used by cube faces to resolve which atlas tile to apply
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceRole {
    Top,
    Bottom,
    Side,
}
