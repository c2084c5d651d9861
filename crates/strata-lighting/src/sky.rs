use strata_chunk::{CHUNK_SIZE_I32, ChunkCoord, ChunkStore, FACE_OFFSETS};

/// Maps a face-plane cell `(u, v)` and inward depth `d` to local xyz for
/// the face with outward offset `off`.
#[inline]
fn face_cell(off: (i32, i32, i32), u: i32, v: i32, d: i32) -> (i32, i32, i32) {
    let last = CHUNK_SIZE_I32 - 1;
    match off {
        (1, 0, 0) => (last - d, u, v),
        (-1, 0, 0) => (d, u, v),
        (0, 1, 0) => (u, last - d, v),
        (0, -1, 0) => (u, d, v),
        (0, 0, 1) => (u, v, last - d),
        _ => (u, v, d),
    }
}

/// Clears and recomputes `sky_exposed` for every block of the chunk. From
/// each face lacking a loaded neighbor, air is marked inward until the first
/// non-air block. Returns the number of exposed blocks.
pub fn compute_sky_exposure(store: &mut ChunkStore, coord: ChunkCoord) -> usize {
    let loaded = store.neighbors_loaded(coord);
    let Some(chunk) = store.get_mut(coord) else {
        return 0;
    };
    for b in chunk.blocks_mut() {
        b.sky_exposed = false;
    }
    let mut exposed = 0;
    for (face, off) in FACE_OFFSETS.iter().copied().enumerate() {
        if loaded.by_face(face) {
            continue;
        }
        for v in 0..CHUNK_SIZE_I32 {
            for u in 0..CHUNK_SIZE_I32 {
                for d in 0..CHUNK_SIZE_I32 {
                    let (x, y, z) = face_cell(off, u, v, d);
                    let i = strata_chunk::Chunk::index(x as usize, y as usize, z as usize);
                    let b = &mut chunk.blocks_mut()[i];
                    if !b.is_air() {
                        break;
                    }
                    if !b.sky_exposed {
                        b.sky_exposed = true;
                        exposed += 1;
                    }
                }
            }
        }
    }
    exposed
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blocks::BlockType;
    use strata_chunk::Chunk;

    #[test]
    fn face_cells_start_on_the_face() {
        for off in FACE_OFFSETS {
            let (x, y, z) = face_cell(off, 3, 4, 0);
            let n = (x + off.0, y + off.1, z + off.2);
            assert!(!Chunk::in_bounds(n.0, n.1, n.2), "{off:?} -> {:?}", (x, y, z));
            let (x1, y1, z1) = face_cell(off, 3, 4, 1);
            assert_eq!((x1 - x, y1 - y, z1 - z), (-off.0, -off.1, -off.2));
        }
    }

    #[test]
    fn isolated_air_chunk_is_fully_exposed() {
        let mut store = ChunkStore::new();
        let c = ChunkCoord::new(0, 0, 0);
        store.insert(Chunk::new(c));
        assert_eq!(compute_sky_exposure(&mut store, c), 4096);
    }

    #[test]
    fn march_stops_at_first_solid() {
        let mut store = ChunkStore::new();
        let c = ChunkCoord::new(0, 0, 0);
        let mut chunk = Chunk::new(c);
        // Solid shell on every face; the interior is sealed off.
        for i in 0..4096 {
            let (x, y, z) = Chunk::delinearize(i);
            let edge = |v: usize| v == 0 || v == 15;
            if edge(x) || edge(y) || edge(z) {
                chunk.set_kind(x as i32, y as i32, z as i32, BlockType::Stone).unwrap();
            }
        }
        store.insert(chunk);
        assert_eq!(compute_sky_exposure(&mut store, c), 0);
        let chunk = store.get(c).unwrap();
        assert!(chunk.blocks().iter().all(|b| !b.sky_exposed));
    }
}
