//! Small value types for positions, directions and boxes in world space.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Sub};

use serde::{Deserialize, Serialize};

/// A point or direction in world space; one unit is one block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Unit vector along `self`; zero stays zero.
    #[inline]
    pub fn normalized(self) -> Vec3 {
        match self.length() {
            len if len > 0.0 => self / len,
            _ => self,
        }
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Block cell containing this point.
    #[inline]
    pub fn floor_to_ivec(self) -> IVec3 {
        IVec3::new(self.x.floor() as i32, self.y.floor() as i32, self.z.floor() as i32)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, o: Vec3) {
        *self = *self + o;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, s: f32) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

/// World block coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl IVec3 {
    pub const ZERO: IVec3 = IVec3::new(0, 0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl Add for IVec3 {
    type Output = IVec3;
    #[inline]
    fn add(self, o: IVec3) -> IVec3 {
        self.offset(o.x, o.y, o.z)
    }
}

impl Sub for IVec3 {
    type Output = IVec3;
    #[inline]
    fn sub(self, o: IVec3) -> IVec3 {
        self.offset(-o.x, -o.y, -o.z)
    }
}

/// Axis-aligned box, used for the observer's body when placing blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The unit cube of the block at `pos`.
    #[inline]
    pub fn block(pos: IVec3) -> Self {
        let min = pos.as_vec3();
        Self::new(min, min + Vec3::new(1.0, 1.0, 1.0))
    }

    /// Open-interval overlap: boxes sharing only a face do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let (a, b) = (self, other);
        a.min.x < b.max.x
            && b.min.x < a.max.x
            && a.min.y < b.max.y
            && b.min.y < a.max.y
            && a.min.z < b.max.z
            && b.min.z < a.max.z
    }
}
