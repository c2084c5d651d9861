use strata_geom::{IVec3, Vec3};

pub const MAX_RAY_STEPS: usize = 512;
/// Direction components smaller than this never cross a cell boundary.
pub const RAY_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub block: IVec3,
    /// Outward normal of the face the ray entered through. Zero when the
    /// ray starts inside a solid block.
    pub normal: IVec3,
    /// Ray length to the entry point.
    pub distance: f32,
}

#[inline]
fn axis_setup(o: f32, d: f32) -> (i32, f32, f32) {
    if d.abs() < RAY_EPSILON {
        return (0, f32::INFINITY, f32::INFINITY);
    }
    let inv = 1.0 / d.abs();
    let f = o - o.floor();
    if d > 0.0 {
        (1, inv, (1.0 - f) * inv)
    } else {
        (-1, inv, f * inv)
    }
}

/// Walks the voxel grid from `origin` along `dir`, one cell boundary at a
/// time, and returns the first cell for which `is_solid` holds. Gives up past
/// `reach` or after `MAX_RAY_STEPS` cells.
pub fn raycast<F>(origin: Vec3, dir: Vec3, reach: f32, mut is_solid: F) -> Option<RayHit>
where
    F: FnMut(IVec3) -> bool,
{
    let len = dir.length();
    if len < RAY_EPSILON {
        return None;
    }
    let d = dir / len;

    let mut cell = origin.floor_to_ivec();
    let (sx, dtx, mut tmx) = axis_setup(origin.x, d.x);
    let (sy, dty, mut tmy) = axis_setup(origin.y, d.y);
    let (sz, dtz, mut tmz) = axis_setup(origin.z, d.z);

    let mut normal = IVec3::ZERO;
    let mut t = 0.0f32;
    for _ in 0..MAX_RAY_STEPS {
        if t > reach {
            return None;
        }
        if is_solid(cell) {
            return Some(RayHit {
                block: cell,
                normal,
                distance: t,
            });
        }
        // Ties go to X, then Y, then Z.
        if tmx <= tmy && tmx <= tmz {
            cell.x += sx;
            t = tmx;
            tmx += dtx;
            normal = IVec3::new(-sx, 0, 0);
        } else if tmy <= tmz {
            cell.y += sy;
            t = tmy;
            tmy += dty;
            normal = IVec3::new(0, -sy, 0);
        } else {
            cell.z += sz;
            t = tmz;
            tmz += dtz;
            normal = IVec3::new(0, 0, -sz);
        }
        if !t.is_finite() {
            return None;
        }
    }
    None
}
