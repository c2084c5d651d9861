use hashbrown::HashMap;
use strata_chunk::{ChunkCoord, ChunkStore};

/// Light raised in chunks other than the one being relit, keyed by chunk and
/// block index. A worker collects it against its snapshot; the owner of the
/// live store merges it back.
#[derive(Clone, Debug, Default)]
pub struct LightSpill {
    cells: HashMap<ChunkCoord, HashMap<usize, u8>>,
}

impl LightSpill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, coord: ChunkCoord, index: usize, level: u8) {
        let slot = self.cells.entry(coord).or_default().entry(index).or_insert(0);
        *slot = (*slot).max(level);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of chunks with raised cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.cells.keys().copied()
    }

    pub fn cells(&self, coord: ChunkCoord) -> Vec<(usize, u8)> {
        let mut v: Vec<(usize, u8)> = self
            .cells
            .get(&coord)
            .map(|m| m.iter().map(|(i, l)| (*i, *l)).collect())
            .unwrap_or_default();
        v.sort_unstable();
        v
    }

    pub fn extend(&mut self, other: LightSpill) {
        for (coord, cells) in other.cells {
            for (i, l) in cells {
                self.record(coord, i, l);
            }
        }
    }

    /// Max-merges into `store`; never lowers light. Chunks that are no longer
    /// loaded are ignored. Returns the chunks whose light actually changed.
    pub fn merge_into(&self, store: &mut ChunkStore) -> Vec<ChunkCoord> {
        let mut changed = Vec::new();
        for (coord, cells) in &self.cells {
            let needs_write = store.get(*coord).is_some_and(|c| {
                cells
                    .iter()
                    .any(|(i, l)| c.blocks().get(*i).is_some_and(|b| b.light < *l))
            });
            if !needs_write {
                continue;
            }
            let Some(chunk) = store.get_mut(*coord) else {
                continue;
            };
            let blocks = chunk.blocks_mut();
            for (i, l) in cells {
                if let Some(b) = blocks.get_mut(*i) {
                    b.light = b.light.max(*l);
                }
            }
            changed.push(*coord);
        }
        changed.sort();
        changed
    }
}
