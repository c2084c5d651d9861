#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborsLoaded {
    pub neg_x: bool,
    pub pos_x: bool,
    pub neg_y: bool,
    pub pos_y: bool,
    pub neg_z: bool,
    pub pos_z: bool,
}

impl NeighborsLoaded {
    #[inline]
    pub const fn empty() -> Self {
        Self {
            neg_x: false,
            pos_x: false,
            neg_y: false,
            pos_y: false,
            neg_z: false,
            pos_z: false,
        }
    }

    #[inline]
    pub const fn all() -> Self {
        Self {
            neg_x: true,
            pos_x: true,
            neg_y: true,
            pos_y: true,
            neg_z: true,
            pos_z: true,
        }
    }

    /// Lookup by offset in `FACE_OFFSETS` order (+X, -X, +Y, -Y, +Z, -Z).
    #[inline]
    pub fn by_face(&self, face: usize) -> bool {
        match face {
            0 => self.pos_x,
            1 => self.neg_x,
            2 => self.pos_y,
            3 => self.neg_y,
            4 => self.pos_z,
            5 => self.neg_z,
            _ => false,
        }
    }

    #[inline]
    pub fn set_face(&mut self, face: usize, loaded: bool) {
        match face {
            0 => self.pos_x = loaded,
            1 => self.neg_x = loaded,
            2 => self.pos_y = loaded,
            3 => self.neg_y = loaded,
            4 => self.pos_z = loaded,
            5 => self.neg_z = loaded,
            _ => {}
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        (0..6).filter(|f| self.by_face(*f)).count()
    }
}
