//! Block lighting: sky exposure, seeding, and flood-fill propagation.
#![forbid(unsafe_code)]

mod propagate;
mod sky;
mod spill;

pub use propagate::{check_fixed_point, propagate, propagate_region, seed_chunk};
pub use sky::compute_sky_exposure;
pub use spill::LightSpill;

use strata_blocks::BlockCatalog;
use strata_blocks::registry::MAX_LIGHT;
use strata_chunk::{ChunkCoord, ChunkStore};

pub const SKY_LIGHT: u8 = MAX_LIGHT;

/// Summary of one relight.
#[derive(Clone, Debug, Default)]
pub struct LightReport {
    pub sky_exposed: usize,
    pub seeded: usize,
    pub raised: usize,
    /// Cells raised outside the relit chunk (or region).
    pub spill: LightSpill,
    /// Other chunks whose light changed, sorted.
    pub changed: Vec<ChunkCoord>,
}

/// Recomputes sky exposure and light for the chunk at `coord` from scratch,
/// then floods into loaded neighbors. Neighbor light is only ever raised.
pub fn relight_chunk(store: &mut ChunkStore, catalog: &BlockCatalog, coord: ChunkCoord) -> LightReport {
    if !store.contains(coord) {
        return LightReport::default();
    }
    let sky_exposed = compute_sky_exposure(store, coord);
    let seeded = seed_chunk(store, catalog, coord);
    let (raised, spill) = propagate(store, catalog, coord);
    log::trace!(
        target: "perf",
        "relit {:?}: sky={} seeded={} raised={} spill_chunks={}",
        coord,
        sky_exposed,
        seeded,
        raised,
        spill.len()
    );
    let mut changed: Vec<ChunkCoord> = spill.coords().collect();
    changed.sort();
    LightReport {
        sky_exposed,
        seeded,
        raised,
        spill,
        changed,
    }
}

fn light_levels(store: &ChunkStore, coord: ChunkCoord) -> Option<Vec<u8>> {
    store
        .get(coord)
        .map(|c| c.blocks().iter().map(|b| b.light).collect())
}

/// Relights the chunk at `coord` together with every loaded chunk in the
/// cube around it, all from their seeds.
///
/// Light never travels further than `MAX_LIGHT - 1` blocks, which is less
/// than a chunk, so nothing outside the cube can hold light that came from
/// an earlier state of `coord`. Use this after contents change in a way that
/// may darken: light that crossed into a neighbor and no longer has a source
/// is lowered, which [`relight_chunk`] alone never does.
pub fn relight_around(store: &mut ChunkStore, catalog: &BlockCatalog, coord: ChunkCoord) -> LightReport {
    if !store.contains(coord) {
        return LightReport::default();
    }
    let region: Vec<ChunkCoord> = coord
        .cube_around(1)
        .into_iter()
        .filter(|c| store.contains(*c))
        .collect();
    let before: Vec<(ChunkCoord, Vec<u8>)> = region
        .iter()
        .filter(|c| **c != coord)
        .filter_map(|c| light_levels(store, *c).map(|l| (*c, l)))
        .collect();

    // Sky exposure depends only on a chunk's own blocks and which of its
    // neighbors are loaded, so only `coord` can have changed.
    let sky_exposed = compute_sky_exposure(store, coord);
    let seeded: usize = region.iter().map(|c| seed_chunk(store, catalog, *c)).sum();
    let (raised, spill) = propagate_region(store, catalog, &region);

    let mut changed: Vec<ChunkCoord> = before
        .into_iter()
        .filter(|(c, old)| light_levels(store, *c).as_ref() != Some(old))
        .map(|(c, _)| c)
        .collect();
    changed.extend(spill.coords());
    changed.sort();
    changed.dedup();
    log::trace!(
        target: "perf",
        "relit around {:?}: chunks={} seeded={} raised={} changed={}",
        coord,
        region.len(),
        seeded,
        raised,
        changed.len()
    );
    LightReport {
        sky_exposed,
        seeded,
        raised,
        spill,
        changed,
    }
}
