use hashbrown::HashSet;
use strata_chunk::ChunkCoord;

/// Chunks edited since they were loaded; these are persisted instead of
/// regenerated.
#[derive(Clone, Debug, Default)]
pub struct ModifiedChunks {
    set: HashSet<ChunkCoord>,
}

impl ModifiedChunks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a chunk is marked.
    pub fn mark(&mut self, coord: ChunkCoord) -> bool {
        self.set.insert(coord)
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.set.contains(&coord)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        self.set.remove(&coord)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Sorted for stable save output.
    pub fn sorted(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self.set.iter().copied().collect();
        v.sort();
        v
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }
}
