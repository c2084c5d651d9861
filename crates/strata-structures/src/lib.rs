//! Decorations placed on generated terrain: trees and floating wisps.
#![forbid(unsafe_code)]

mod plan;
mod rng;

pub use plan::{StructureKind, StructurePlan, plan_tree, plan_wisp};
pub use rng::{hash3, rand01};

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use strata_blocks::BlockType;
use strata_chunk::{CHUNK_SIZE_I32, Chunk, ChunkCoord, ChunkStore, split_world};
use strata_geom::IVec3;
use strata_world::chunk_seed;

const SALT_TREE: u32 = 0x5EED_7AEE;
const SALT_TRUNK: u32 = 0x0071_4E6B;
const SALT_WISP: u32 = 0x0057_1590;
const SALT_WISP_HEIGHT: u32 = 0x00A1_7173;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationParams {
    /// Chance per anchor to attempt a tree.
    #[serde(default = "d_tree_chance")]
    pub tree_chance: f32,
    #[serde(default = "d_trunk_min")]
    pub trunk_min: i32,
    #[serde(default = "d_trunk_max")]
    pub trunk_max: i32,
    #[serde(default = "d_canopy_radius")]
    pub canopy_radius: i32,
    /// Chance per anchor (without a tree) to attempt a wisp.
    #[serde(default = "d_wisp_chance")]
    pub wisp_chance: f32,
    #[serde(default = "d_wisp_min")]
    pub wisp_min_height: i32,
    #[serde(default = "d_wisp_max")]
    pub wisp_max_height: i32,
}
fn d_tree_chance() -> f32 {
    0.015
}
fn d_trunk_min() -> i32 {
    4
}
fn d_trunk_max() -> i32 {
    6
}
fn d_canopy_radius() -> i32 {
    2
}
fn d_wisp_chance() -> f32 {
    0.003
}
fn d_wisp_min() -> i32 {
    2
}
fn d_wisp_max() -> i32 {
    4
}

impl Default for DecorationParams {
    fn default() -> Self {
        Self {
            tree_chance: d_tree_chance(),
            trunk_min: d_trunk_min(),
            trunk_max: d_trunk_max(),
            canopy_radius: d_canopy_radius(),
            wisp_chance: d_wisp_chance(),
            wisp_min_height: d_wisp_min(),
            wisp_max_height: d_wisp_max(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecorationReport {
    pub placed: usize,
    pub skipped: usize,
    /// Chunks that received at least one block, sorted.
    pub touched: Vec<ChunkCoord>,
}

/// Why a structure was not placed. Nothing is written in either case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceRejected {
    ChunkNotLoaded(ChunkCoord),
    Occupied(IVec3),
}

/// Places every cell of `plan` or none of them. Returns the chunks written.
pub fn try_place(store: &mut ChunkStore, plan: &StructurePlan) -> Result<Vec<ChunkCoord>, PlaceRejected> {
    for &(pos, _) in &plan.cells {
        match store.block_at_world(pos) {
            None => return Err(PlaceRejected::ChunkNotLoaded(ChunkCoord::from_world(pos))),
            Some(b) if !b.is_air() => return Err(PlaceRejected::Occupied(pos)),
            Some(_) => {}
        }
    }
    let mut touched = HashSet::new();
    for &(pos, kind) in &plan.cells {
        if kind.is_air() {
            continue;
        }
        let (coord, local) = split_world(pos);
        let Some(chunk) = store.get_mut(coord) else {
            return Err(PlaceRejected::ChunkNotLoaded(coord));
        };
        // Bounds were established by `split_world`.
        if chunk.set_kind(local.x, local.y, local.z, kind).is_ok() {
            touched.insert(coord);
        }
    }
    let mut touched: Vec<ChunkCoord> = touched.into_iter().collect();
    touched.sort();
    Ok(touched)
}

/// Grass blocks with air directly above, in scan order.
fn anchors(store: &ChunkStore, chunk: &Chunk) -> Vec<IVec3> {
    let mut out = Vec::new();
    for (i, b) in chunk.blocks().iter().enumerate() {
        if b.kind != BlockType::Grass {
            continue;
        }
        let (x, y, z) = Chunk::delinearize(i);
        let above = if (y as i32) + 1 < CHUNK_SIZE_I32 {
            Some(chunk.get_block(x as i32, y as i32 + 1, z as i32))
        } else {
            store.block_at_world(b.pos.offset(0, 1, 0))
        };
        if above.is_some_and(|a| a.is_air()) {
            out.push(b.pos);
        }
    }
    out
}

fn roll_range(seed: u64, pos: IVec3, salt: u32, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        return lo;
    }
    let span = (hi - lo + 1) as u32;
    lo + (rng::hash3(pos.x, pos.y, pos.z, rng::fold(seed) ^ salt) % span) as i32
}

/// Decorates the chunk at `coord`. Structures may extend into loaded
/// neighbors; a structure that would leave the loaded set or overlap a
/// non-air cell is skipped whole.
pub fn decorate_chunk(
    store: &mut ChunkStore,
    coord: ChunkCoord,
    world_seed: u64,
    params: &DecorationParams,
) -> DecorationReport {
    let mut report = DecorationReport::default();
    let Some(chunk) = store.get(coord) else {
        return report;
    };
    let seed = chunk_seed(world_seed, coord);
    let mut touched: HashSet<ChunkCoord> = HashSet::new();
    for anchor in anchors(store, chunk) {
        let plan = if rand01(seed, anchor, SALT_TREE) < params.tree_chance {
            let trunk = roll_range(seed, anchor, SALT_TRUNK, params.trunk_min, params.trunk_max);
            plan_tree(anchor, trunk, params.canopy_radius)
        } else if rand01(seed, anchor, SALT_WISP) < params.wisp_chance {
            let h = roll_range(
                seed,
                anchor,
                SALT_WISP_HEIGHT,
                params.wisp_min_height,
                params.wisp_max_height,
            );
            plan_wisp(anchor, h)
        } else {
            continue;
        };
        match try_place(store, &plan) {
            Ok(written) => {
                report.placed += 1;
                touched.extend(written);
            }
            Err(why) => {
                log::trace!(target: "stream", "skipped {:?} at {:?}: {:?}", plan.kind, anchor, why);
                report.skipped += 1;
            }
        }
    }
    report.touched = touched.into_iter().collect();
    report.touched.sort();
    if report.placed > 0 || report.skipped > 0 {
        log::debug!(
            target: "stream",
            "decorated {:?}: placed={} skipped={} touched={}",
            coord,
            report.placed,
            report.skipped,
            report.touched.len()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_world::{WorldGenParams, generate_chunk};

    fn flat_store(coords: &[ChunkCoord]) -> ChunkStore {
        let p = WorldGenParams::flat(6);
        let mut store = ChunkStore::new();
        for &c in coords {
            store.insert(generate_chunk(1, &p, c));
        }
        store
    }

    #[test]
    fn anchors_are_exposed_grass() {
        let c = ChunkCoord::new(0, 0, 0);
        let store = flat_store(&[c]);
        let a = anchors(&store, store.get(c).unwrap());
        assert_eq!(a.len(), 16 * 16);
        assert!(a.iter().all(|p| p.y == 5));
    }

    #[test]
    fn grass_at_chunk_top_needs_loaded_chunk_above() {
        let c = ChunkCoord::new(0, 0, 0);
        let p = WorldGenParams::flat(16);
        let mut store = ChunkStore::new();
        store.insert(generate_chunk(1, &p, c));
        assert!(anchors(&store, store.get(c).unwrap()).is_empty());
        store.insert(generate_chunk(1, &p, c.offset(0, 1, 0)));
        assert_eq!(anchors(&store, store.get(c).unwrap()).len(), 256);
    }

    #[test]
    fn zero_chances_place_nothing() {
        let c = ChunkCoord::new(0, 0, 0);
        let mut store = flat_store(&[c]);
        let params = DecorationParams {
            tree_chance: 0.0,
            wisp_chance: 0.0,
            ..DecorationParams::default()
        };
        let v = store.get(c).unwrap().version();
        let r = decorate_chunk(&mut store, c, 7, &params);
        assert_eq!(r, DecorationReport::default());
        assert_eq!(store.get(c).unwrap().version(), v);
    }
}
