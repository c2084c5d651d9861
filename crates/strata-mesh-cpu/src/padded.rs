use strata_chunk::{Block, CHUNK_SIZE_I32, Chunk, ChunkCoord, ChunkStore};

const PAD: i32 = CHUNK_SIZE_I32 + 2;

/// A chunk plus a one-cell apron read from whichever of the 26 surrounding
/// chunks are loaded. Apron cells of unloaded chunks are `None`.
pub(crate) struct Padded {
    cells: Vec<Option<Block>>,
}

impl Padded {
    pub(crate) fn gather(store: &ChunkStore, coord: ChunkCoord) -> Option<Self> {
        store.get(coord)?;
        let mut around: [Option<&Chunk>; 27] = [None; 27];
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    around[Self::slot(dx, dy, dz)] = store.get(coord.offset(dx, dy, dz));
                }
            }
        }
        let mut cells = Vec::with_capacity((PAD * PAD * PAD) as usize);
        for z in -1..=CHUNK_SIZE_I32 {
            for y in -1..=CHUNK_SIZE_I32 {
                for x in -1..=CHUNK_SIZE_I32 {
                    let (dx, lx) = Self::split(x);
                    let (dy, ly) = Self::split(y);
                    let (dz, lz) = Self::split(z);
                    cells.push(around[Self::slot(dx, dy, dz)].map(|c| c.get_block(lx, ly, lz)));
                }
            }
        }
        Some(Self { cells })
    }

    #[inline]
    fn slot(dx: i32, dy: i32, dz: i32) -> usize {
        ((dx + 1) + (dy + 1) * 3 + (dz + 1) * 9) as usize
    }

    /// Chunk offset and local coordinate of a padded coordinate.
    #[inline]
    fn split(v: i32) -> (i32, i32) {
        if v < 0 {
            (-1, v + CHUNK_SIZE_I32)
        } else if v >= CHUNK_SIZE_I32 {
            (1, v - CHUNK_SIZE_I32)
        } else {
            (0, v)
        }
    }

    /// Local coordinates in `-1..=CHUNK_SIZE`.
    #[inline]
    pub(crate) fn get(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        if !(-1..=CHUNK_SIZE_I32).contains(&x)
            || !(-1..=CHUNK_SIZE_I32).contains(&y)
            || !(-1..=CHUNK_SIZE_I32).contains(&z)
        {
            return None;
        }
        let i = ((x + 1) + PAD * ((y + 1) + PAD * (z + 1))) as usize;
        self.cells[i].as_ref()
    }

    /// Mean light of the up-to-8 loaded cells sharing lattice corner
    /// `(cx, cy, cz)`, or 0 when none are loaded.
    pub(crate) fn corner_light(&self, cx: i32, cy: i32, cz: i32) -> f32 {
        let mut sum = 0u32;
        let mut n = 0u32;
        for dz in -1..=0 {
            for dy in -1..=0 {
                for dx in -1..=0 {
                    if let Some(b) = self.get(cx + dx, cy + dy, cz + dz) {
                        sum += u32::from(b.light);
                        n += 1;
                    }
                }
            }
        }
        if n == 0 { 0.0 } else { sum as f32 / n as f32 }
    }
}
