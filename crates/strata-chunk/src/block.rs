use strata_blocks::{Biome, BlockType};
use strata_geom::IVec3;

/// A single voxel: identity plus mutable light state.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Block {
    pub kind: BlockType,
    pub pos: IVec3,
    pub biome: Biome,
    /// 0..=15
    pub light: u8,
    pub sky_exposed: bool,
    /// Generated inside the landmass noise threshold.
    pub in_landmass: bool,
}

impl Block {
    #[inline]
    pub const fn air(pos: IVec3) -> Self {
        Self {
            kind: BlockType::Air,
            pos,
            biome: Biome::None,
            light: 0,
            sky_exposed: false,
            in_landmass: false,
        }
    }

    #[inline]
    pub const fn new(kind: BlockType, pos: IVec3) -> Self {
        Self {
            kind,
            pos,
            biome: Biome::None,
            light: 0,
            sky_exposed: false,
            in_landmass: false,
        }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.kind.is_air()
    }
}
