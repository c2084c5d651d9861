use serde::{Deserialize, Serialize};
use strata_geom::{IVec3, Vec3};

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Axis-adjacent chunk offsets in +X, -X, +Y, -Y, +Z, -Z order.
pub const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Chunk-space key for the chunk map. Equality and hashing are plain
/// component-wise integer comparisons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    /// Chunk containing a world block position.
    #[inline]
    pub fn from_world(pos: IVec3) -> Self {
        Self {
            cx: pos.x.div_euclid(CHUNK_SIZE_I32),
            cy: pos.y.div_euclid(CHUNK_SIZE_I32),
            cz: pos.z.div_euclid(CHUNK_SIZE_I32),
        }
    }

    /// Chunk containing a continuous world position (e.g. the observer).
    #[inline]
    pub fn containing(p: Vec3) -> Self {
        Self::from_world(p.floor_to_ivec())
    }

    /// World position of local cell (0,0,0).
    #[inline]
    pub fn origin(self) -> IVec3 {
        IVec3::new(
            self.cx * CHUNK_SIZE_I32,
            self.cy * CHUNK_SIZE_I32,
            self.cz * CHUNK_SIZE_I32,
        )
    }

    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx)
            .abs()
            .max((self.cy - other.cy).abs())
            .max((self.cz - other.cz).abs())
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    pub fn face_neighbors(self) -> [ChunkCoord; 6] {
        FACE_OFFSETS.map(|(dx, dy, dz)| self.offset(dx, dy, dz))
    }

    /// Every coordinate within Chebyshev distance `radius`, nearest shells first.
    pub fn cube_around(self, radius: i32) -> Vec<ChunkCoord> {
        let radius = radius.max(0);
        let side = (2 * radius + 1) as usize;
        let mut out = Vec::with_capacity(side * side * side);
        for dz in -radius..=radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    out.push(self.offset(dx, dy, dz));
                }
            }
        }
        out.sort_by_key(|c| (self.chebyshev(*c), self.distance_sq(*c)));
        out
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

/// Splits a world position into its chunk and the local offset inside it.
#[inline]
pub fn split_world(pos: IVec3) -> (ChunkCoord, IVec3) {
    let coord = ChunkCoord::from_world(pos);
    (coord, pos - coord.origin())
}
