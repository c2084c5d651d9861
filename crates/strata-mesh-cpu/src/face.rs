use strata_blocks::FaceRole;
use strata_geom::{IVec3, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::new(dx as f32, dy as f32, dz as f32)
    }

    /// Grid step out through this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn role(self) -> FaceRole {
        match self {
            Face::PosY => FaceRole::Top,
            Face::NegY => FaceRole::Bottom,
            _ => FaceRole::Side,
        }
    }

    /// Lattice corners of this face of the unit cell at the origin, counter-
    /// clockwise seen from outside: bottom-left, bottom-right, top-right,
    /// top-left in texture space.
    pub fn corners(self) -> [IVec3; 4] {
        let c = IVec3::new;
        match self {
            Face::PosY => [c(0, 1, 1), c(1, 1, 1), c(1, 1, 0), c(0, 1, 0)],
            Face::NegY => [c(0, 0, 0), c(1, 0, 0), c(1, 0, 1), c(0, 0, 1)],
            Face::PosX => [c(1, 0, 1), c(1, 0, 0), c(1, 1, 0), c(1, 1, 1)],
            Face::NegX => [c(0, 0, 0), c(0, 0, 1), c(0, 1, 1), c(0, 1, 0)],
            Face::PosZ => [c(0, 0, 1), c(1, 0, 1), c(1, 1, 1), c(0, 1, 1)],
            Face::NegZ => [c(1, 0, 0), c(0, 0, 0), c(0, 1, 0), c(1, 1, 0)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_winding_matches_normal() {
        for face in Face::ALL {
            let [a, b, c, _] = face.corners().map(|p| p.as_vec3());
            let n = (b - a).cross(c - a).normalized();
            let want = face.normal();
            assert!((n - want).length() < 1e-5, "{face:?}: {n:?}");
        }
    }

    #[test]
    fn corners_lie_on_the_face_plane() {
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            for p in face.corners() {
                let on = |d: i32, v: i32| d == 0 || (d > 0 && v == 1) || (d < 0 && v == 0);
                assert!(on(dx, p.x) && on(dy, p.y) && on(dz, p.z));
            }
        }
    }
}
