use strata_blocks::BlockType;
use strata_geom::IVec3;
use thiserror::Error;

use crate::block::Block;
use crate::coord::{CHUNK_SIZE, CHUNK_SIZE_I32, CHUNK_VOLUME, ChunkCoord};

/// Pipeline progress of a chunk. Ordering follows the pipeline, and a chunk
/// only ever moves forward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ChunkGenState {
    #[default]
    Uninitialized,
    TerrainGenerated,
    StagingQueued,
    DecorationsAndRemeshDone,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("local position ({x}, {y}, {z}) is outside the chunk")]
    OutOfBounds { x: i32, y: i32, z: i32 },
    #[error("block count {0} does not match chunk volume")]
    BadVolume(usize),
}

#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    state: ChunkGenState,
    version: u64,
    blocks: Vec<Block>,
}

impl Chunk {
    /// An all-air chunk with every block's world position filled in.
    pub fn new(coord: ChunkCoord) -> Self {
        let origin = coord.origin();
        let mut blocks = Vec::with_capacity(CHUNK_VOLUME);
        for i in 0..CHUNK_VOLUME {
            let (x, y, z) = Self::delinearize(i);
            blocks.push(Block::air(origin.offset(x as i32, y as i32, z as i32)));
        }
        Self {
            coord,
            state: ChunkGenState::Uninitialized,
            version: 0,
            blocks,
        }
    }

    /// Rebuilds a chunk from a flat scan-order block list (e.g. a save record).
    pub fn from_blocks(coord: ChunkCoord, blocks: Vec<Block>) -> Result<Self, ChunkError> {
        if blocks.len() != CHUNK_VOLUME {
            return Err(ChunkError::BadVolume(blocks.len()));
        }
        Ok(Self {
            coord,
            state: ChunkGenState::Uninitialized,
            version: 0,
            blocks,
        })
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.coord.origin()
    }

    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_SIZE * (y + CHUNK_SIZE * z)
    }

    #[inline]
    pub fn delinearize(i: usize) -> (usize, usize, usize) {
        let x = i % CHUNK_SIZE;
        let y = (i / CHUNK_SIZE) % CHUNK_SIZE;
        let z = i / (CHUNK_SIZE * CHUNK_SIZE);
        (x, y, z)
    }

    #[inline]
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_SIZE_I32).contains(&x)
            && (0..CHUNK_SIZE_I32).contains(&y)
            && (0..CHUNK_SIZE_I32).contains(&z)
    }

    /// Out-of-range reads return an air sentinel positioned where the cell
    /// would be in world space.
    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index(x as usize, y as usize, z as usize)]
        } else {
            Block::air(self.origin().offset(x, y, z))
        }
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) -> Result<(), ChunkError> {
        if !Self::in_bounds(x, y, z) {
            return Err(ChunkError::OutOfBounds { x, y, z });
        }
        self.blocks[Self::index(x as usize, y as usize, z as usize)] = block;
        self.touch();
        Ok(())
    }

    /// Replaces only the type of a block; light and flags are kept. Returns the
    /// previous type.
    pub fn set_kind(&mut self, x: i32, y: i32, z: i32, kind: BlockType) -> Result<BlockType, ChunkError> {
        if !Self::in_bounds(x, y, z) {
            return Err(ChunkError::OutOfBounds { x, y, z });
        }
        let b = &mut self.blocks[Self::index(x as usize, y as usize, z as usize)];
        let prev = b.kind;
        b.kind = kind;
        self.touch();
        Ok(prev)
    }

    /// Light writes leave identity and `version` alone; lighting runs after
    /// every content change anyway.
    pub fn set_light(&mut self, x: i32, y: i32, z: i32, level: u8) -> Result<(), ChunkError> {
        if !Self::in_bounds(x, y, z) {
            return Err(ChunkError::OutOfBounds { x, y, z });
        }
        self.blocks[Self::index(x as usize, y as usize, z as usize)].light = level.min(15);
        Ok(())
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Direct block access for generators and lighting; callers are expected
    /// to `touch` once they are done.
    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    #[inline]
    pub fn light_at(&self, i: usize) -> u8 {
        self.blocks[i].light
    }

    #[inline]
    pub fn state(&self) -> ChunkGenState {
        self.state
    }

    /// Moves the chunk forward in the pipeline. Returns `false` (and leaves
    /// the state alone) for a regression.
    pub fn advance_to(&mut self, next: ChunkGenState) -> bool {
        if next < self.state {
            return false;
        }
        self.state = next;
        true
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Marks the contents as changed so stale meshes are detected.
    #[inline]
    pub fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_air())
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        !self.has_non_air()
    }
}
