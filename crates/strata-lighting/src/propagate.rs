use std::collections::VecDeque;

use strata_blocks::BlockCatalog;
use strata_chunk::{Block, CHUNK_SIZE_I32, Chunk, ChunkCoord, ChunkStore, FACE_OFFSETS, split_world};
use strata_geom::IVec3;

use crate::SKY_LIGHT;
use crate::spill::LightSpill;

/// Light a cell hands to its neighbors. Non-conducting cells only pass on
/// their own emission.
#[inline]
fn source_level(catalog: &BlockCatalog, b: &Block) -> u8 {
    if catalog.conducts_light(b.kind) {
        b.light
    } else {
        catalog.emission(b.kind)
    }
}

#[inline]
fn seed_level(catalog: &BlockCatalog, b: &Block) -> u8 {
    let sky = if b.is_air() && b.sky_exposed { SKY_LIGHT } else { 0 };
    catalog.emission(b.kind).max(sky)
}

/// Resets every block of the chunk to its seed value. Returns how many
/// blocks start lit.
pub fn seed_chunk(store: &mut ChunkStore, catalog: &BlockCatalog, coord: ChunkCoord) -> usize {
    let Some(chunk) = store.get_mut(coord) else {
        return 0;
    };
    let mut lit = 0;
    for b in chunk.blocks_mut() {
        b.light = seed_level(catalog, b);
        if b.light > 0 {
            lit += 1;
        }
    }
    lit
}

/// Loaded neighbor cells directly across each face of `coord`. Neighbors
/// for which `skip` holds are being relit too and contribute nothing.
fn boundary_sources(
    store: &ChunkStore,
    catalog: &BlockCatalog,
    coord: ChunkCoord,
    skip: impl Fn(ChunkCoord) -> bool,
    out: &mut VecDeque<IVec3>,
) {
    let origin = coord.origin();
    let n = CHUNK_SIZE_I32;
    for (dx, dy, dz) in FACE_OFFSETS {
        let nc = coord.offset(dx, dy, dz);
        if skip(nc) {
            continue;
        }
        let Some(neighbor) = store.get(nc) else {
            continue;
        };
        for v in 0..n {
            for u in 0..n {
                let local = match (dx, dy, dz) {
                    (1, 0, 0) => (n, u, v),
                    (-1, 0, 0) => (-1, u, v),
                    (0, 1, 0) => (u, n, v),
                    (0, -1, 0) => (u, -1, v),
                    (0, 0, 1) => (u, v, n),
                    _ => (u, v, -1),
                };
                let pos = origin.offset(local.0, local.1, local.2);
                let (_, nl) = split_world(pos);
                let b = neighbor.get_block(nl.x, nl.y, nl.z);
                if source_level(catalog, &b) > 1 {
                    out.push_back(pos);
                }
            }
        }
    }
}

fn chunk_sources(store: &ChunkStore, catalog: &BlockCatalog, coord: ChunkCoord, out: &mut VecDeque<IVec3>) {
    if let Some(chunk) = store.get(coord) {
        out.extend(
            chunk
                .blocks()
                .iter()
                .filter(|b| source_level(catalog, b) > 1)
                .map(|b| b.pos),
        );
    }
}

/// Breadth-first relaxation from `queue`. Raises outside the chunks for
/// which `inside` holds are recorded in the spill.
fn flood(
    store: &mut ChunkStore,
    catalog: &BlockCatalog,
    mut queue: VecDeque<IVec3>,
    inside: impl Fn(ChunkCoord) -> bool,
) -> (usize, LightSpill) {
    let mut spill = LightSpill::new();
    let mut raised = 0;
    while let Some(pos) = queue.pop_front() {
        let Some(src) = store.block_at_world(pos) else {
            continue;
        };
        let level = source_level(catalog, &src);
        if level <= 1 {
            continue;
        }
        let next = level - 1;
        for (dx, dy, dz) in FACE_OFFSETS {
            let npos = pos.offset(dx, dy, dz);
            let (nc, local) = split_world(npos);
            // Absent chunks stop propagation.
            let Some(target) = store.block_at_world(npos) else {
                continue;
            };
            if !catalog.conducts_light(target.kind) || target.light >= next {
                continue;
            }
            let Some(nchunk) = store.get_mut(nc) else {
                continue;
            };
            let i = Chunk::index(local.x as usize, local.y as usize, local.z as usize);
            nchunk.blocks_mut()[i].light = next;
            raised += 1;
            if !inside(nc) {
                spill.record(nc, i, next);
            }
            queue.push_back(npos);
        }
    }
    (raised, spill)
}

/// Flood-fills light out of the seeded chunk at `coord`, also pulling light
/// in from the facing layers of loaded neighbors. Returns the number of
/// raised cells and the part of that raise that landed in other chunks.
pub fn propagate(store: &mut ChunkStore, catalog: &BlockCatalog, coord: ChunkCoord) -> (usize, LightSpill) {
    if !store.contains(coord) {
        return (0, LightSpill::new());
    }
    let mut queue = VecDeque::new();
    chunk_sources(store, catalog, coord, &mut queue);
    boundary_sources(store, catalog, coord, |_| false, &mut queue);
    flood(store, catalog, queue, |c| c == coord)
}

/// [`propagate`] over several freshly seeded chunks at once. Only chunks
/// outside `region` feed boundary light in, so no chunk in the region reads
/// back light it held before seeding.
pub fn propagate_region(store: &mut ChunkStore, catalog: &BlockCatalog, region: &[ChunkCoord]) -> (usize, LightSpill) {
    let inside = |c: ChunkCoord| region.contains(&c);
    let mut queue = VecDeque::new();
    for &c in region {
        chunk_sources(store, catalog, c, &mut queue);
        boundary_sources(store, catalog, c, inside, &mut queue);
    }
    flood(store, catalog, queue, inside)
}

/// Cells of the chunk at `coord` where one more relaxation step would still
/// raise light, or where light sits below the seed value. Empty once the
/// chunk has converged against its loaded neighbors.
pub fn check_fixed_point(store: &ChunkStore, catalog: &BlockCatalog, coord: ChunkCoord) -> Vec<IVec3> {
    let Some(chunk) = store.get(coord) else {
        return Vec::new();
    };
    let mut bad = Vec::new();
    for b in chunk.blocks() {
        if b.light < seed_level(catalog, b) {
            bad.push(b.pos);
            continue;
        }
        if !catalog.conducts_light(b.kind) {
            continue;
        }
        let best = FACE_OFFSETS
            .iter()
            .filter_map(|(dx, dy, dz)| store.block_at_world(b.pos.offset(*dx, *dy, *dz)))
            .map(|n| source_level(catalog, &n))
            .max()
            .unwrap_or(0);
        if b.light < best.saturating_sub(1) {
            bad.push(b.pos);
        }
    }
    bad
}
