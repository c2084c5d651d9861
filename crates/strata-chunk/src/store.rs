use std::sync::Arc;

use hashbrown::HashMap;
use strata_geom::IVec3;

use crate::block::Block;
use crate::chunk::Chunk;
use crate::coord::{ChunkCoord, split_world};
use crate::neighbors::NeighborsLoaded;

/// Owner of every loaded chunk.
///
/// Chunks are held behind `Arc` so background tasks can read published chunks
/// through cheap snapshots. Mutation goes through [`ChunkStore::get_mut`], which
/// copies a chunk if a snapshot still references it; readers never observe a
/// write in progress.
#[derive(Clone, Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkCoord, Arc<Chunk>>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn insert(&mut self, chunk: Chunk) -> Option<Arc<Chunk>> {
        self.chunks.insert(chunk.coord(), Arc::new(chunk))
    }

    pub fn insert_arc(&mut self, chunk: Arc<Chunk>) -> Option<Arc<Chunk>> {
        self.chunks.insert(chunk.coord(), chunk)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.remove(&coord)
    }

    /// Removes a chunk and returns it by value, cloning only if a snapshot
    /// still shares it.
    pub fn take(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord).map(Arc::unwrap_or_clone)
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord).map(|c| c.as_ref())
    }

    #[inline]
    pub fn get_arc(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.chunks.get(&coord).cloned()
    }

    #[inline]
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord).map(Arc::make_mut)
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &Chunk)> + '_ {
        self.chunks.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    /// `None` when the containing chunk is not loaded.
    pub fn block_at_world(&self, pos: IVec3) -> Option<Block> {
        let (coord, local) = split_world(pos);
        self.get(coord)
            .map(|c| c.get_block(local.x, local.y, local.z))
    }

    pub fn neighbors_loaded(&self, coord: ChunkCoord) -> NeighborsLoaded {
        let mut n = NeighborsLoaded::empty();
        for (face, nc) in coord.face_neighbors().into_iter().enumerate() {
            n.set_face(face, self.contains(nc));
        }
        n
    }

    /// A store holding `coord` and its loaded face neighbors. Shares chunk
    /// data with `self` until either side writes.
    pub fn region_snapshot(&self, coord: ChunkCoord) -> ChunkStore {
        let mut region = ChunkStore::new();
        if let Some(c) = self.get_arc(coord) {
            region.insert_arc(c);
        }
        for nc in coord.face_neighbors() {
            if let Some(c) = self.get_arc(nc) {
                region.insert_arc(c);
            }
        }
        region
    }

    /// Like [`region_snapshot`](Self::region_snapshot) but with all 26
    /// surrounding chunks, which is what mesh corner shading reads.
    pub fn neighborhood_snapshot(&self, coord: ChunkCoord) -> ChunkStore {
        let mut region = ChunkStore::new();
        for nc in coord.cube_around(1) {
            if let Some(c) = self.get_arc(nc) {
                region.insert_arc(c);
            }
        }
        region
    }
}
