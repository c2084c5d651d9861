use strata_blocks::{BlockCatalog, BlockType};
use strata_chunk::{ChunkCoord, ChunkError, ChunkStore, split_world};
use strata_geom::{Aabb, IVec3};
use thiserror::Error;

use crate::raycast::RayHit;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no block is selected")]
    NoSelection,
    #[error("chunk {0:?} is not loaded")]
    ChunkNotLoaded(ChunkCoord),
    #[error("position {0:?} is outside its chunk")]
    OutOfBounds(IVec3),
    #[error("nothing to break at {0:?}")]
    BreakAir(IVec3),
    #[error("{kind:?} at {pos:?} is unbreakable")]
    Unbreakable { pos: IVec3, kind: BlockType },
    #[error("cannot place air")]
    PlaceAir,
    #[error("target {0:?} is occupied")]
    Occupied(IVec3),
    #[error("target {0:?} intersects the observer")]
    IntersectsObserver(IVec3),
}

impl From<(IVec3, ChunkError)> for EditError {
    fn from((pos, _): (IVec3, ChunkError)) -> Self {
        EditError::OutOfBounds(pos)
    }
}

/// A completed edit and the chunks whose meshes it invalidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub coord: ChunkCoord,
    pub pos: IVec3,
    pub previous: BlockType,
    pub placed: BlockType,
    /// Loaded face neighbors of `coord`.
    pub neighbors: Vec<ChunkCoord>,
}

fn write_kind(store: &mut ChunkStore, pos: IVec3, kind: BlockType) -> Result<EditOutcome, EditError> {
    let (coord, local) = split_world(pos);
    let chunk = store.get_mut(coord).ok_or(EditError::ChunkNotLoaded(coord))?;
    let previous = chunk
        .set_kind(local.x, local.y, local.z, kind)
        .map_err(|e| EditError::from((pos, e)))?;
    let neighbors = coord
        .face_neighbors()
        .into_iter()
        .filter(|n| store.contains(*n))
        .collect();
    Ok(EditOutcome {
        coord,
        pos,
        previous,
        placed: kind,
        neighbors,
    })
}

/// Replaces the block at `pos` with air. Landmass and biome tags stay.
pub fn break_block(store: &mut ChunkStore, catalog: &BlockCatalog, pos: IVec3) -> Result<EditOutcome, EditError> {
    let block = store
        .block_at_world(pos)
        .ok_or_else(|| EditError::ChunkNotLoaded(ChunkCoord::from_world(pos)))?;
    if block.is_air() {
        return Err(EditError::BreakAir(pos));
    }
    if !catalog.is_breakable(block.kind) {
        return Err(EditError::Unbreakable { pos, kind: block.kind });
    }
    let outcome = write_kind(store, pos, BlockType::Air)?;
    log::info!(target: "edit", "broke {:?} at {:?}", outcome.previous, pos);
    Ok(outcome)
}

/// Unit axis of the largest normal component; ties resolve X, Y, Z.
fn dominant_axis(n: IVec3) -> IVec3 {
    let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
    if ax == 0 && ay == 0 && az == 0 {
        IVec3::ZERO
    } else if ax >= ay && ax >= az {
        IVec3::new(n.x.signum(), 0, 0)
    } else if ay >= az {
        IVec3::new(0, n.y.signum(), 0)
    } else {
        IVec3::new(0, 0, n.z.signum())
    }
}

/// Cell a placement against `hit` would fill.
#[inline]
pub fn place_target(hit: &RayHit) -> IVec3 {
    hit.block + dominant_axis(hit.normal)
}

/// Places `kind` against the hit face.
pub fn place_block(
    store: &mut ChunkStore,
    hit: &RayHit,
    kind: BlockType,
    observer: Option<Aabb>,
) -> Result<EditOutcome, EditError> {
    if kind.is_air() {
        return Err(EditError::PlaceAir);
    }
    let target = place_target(hit);
    let current = store
        .block_at_world(target)
        .ok_or_else(|| EditError::ChunkNotLoaded(ChunkCoord::from_world(target)))?;
    if !current.is_air() {
        return Err(EditError::Occupied(target));
    }
    if observer.is_some_and(|o| o.intersects(&Aabb::block(target))) {
        return Err(EditError::IntersectsObserver(target));
    }
    let outcome = write_kind(store, target, kind)?;
    log::info!(target: "edit", "placed {:?} at {:?}", kind, target);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_axis_picks_largest() {
        assert_eq!(dominant_axis(IVec3::new(0, -1, 0)), IVec3::new(0, -1, 0));
        assert_eq!(dominant_axis(IVec3::new(2, -5, 1)), IVec3::new(0, -1, 0));
        assert_eq!(dominant_axis(IVec3::new(3, 3, 3)), IVec3::new(1, 0, 0));
        assert_eq!(dominant_axis(IVec3::ZERO), IVec3::ZERO);
    }
}
