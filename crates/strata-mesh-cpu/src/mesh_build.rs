use std::mem::size_of;

use strata_blocks::UvRect;
use strata_geom::Vec3;

/// Render pass a mesh belongs to. Transparent geometry is drawn after all
/// opaque geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshPass {
    Opaque,
    Transparent,
}

impl MeshPass {
    pub const ALL: [MeshPass; 2] = [MeshPass::Opaque, MeshPass::Transparent];
}

/// Plain vertex and index buffers, ready for upload. Holds no renderer
/// resources.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub colors: Vec<u8>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.positions.reserve(n_quads * 4 * 3);
        self.normals.reserve(n_quads * 4 * 3);
        self.uvs.reserve(n_quads * 4 * 2);
        self.colors.reserve(n_quads * 4 * 4);
        self.indices.reserve(n_quads * 6);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn byte_size(&self) -> usize {
        self.positions.len() * size_of::<f32>()
            + self.normals.len() * size_of::<f32>()
            + self.uvs.len() * size_of::<f32>()
            + self.colors.len()
            + self.indices.len() * size_of::<u32>()
    }

    /// Centroid of quad `face` (in emission order).
    pub fn face_centroid(&self, face: usize) -> Option<Vec3> {
        let base = face * 4 * 3;
        let p = self.positions.get(base..base + 12)?;
        let sum = (0..4).fold(Vec3::ZERO, |acc, v| {
            acc + Vec3::new(p[v * 3], p[v * 3 + 1], p[v * 3 + 2])
        });
        Some(sum / 4.0)
    }

    /// Appends a quad whose corners are already counter-clockwise around `n`.
    /// Corners map to the UV rect as bottom-left, bottom-right, top-right,
    /// top-left.
    pub fn add_quad(&mut self, corners: [Vec3; 4], n: Vec3, uv: UvRect, colors: [[u8; 4]; 4]) {
        let base = self.vertex_count() as u32;
        let uvs = [(uv.u0, uv.v1), (uv.u1, uv.v1), (uv.u1, uv.v0), (uv.u0, uv.v0)];
        for i in 0..4 {
            let v = corners[i];
            self.positions.extend_from_slice(&[v.x, v.y, v.z]);
            self.normals.extend_from_slice(&[n.x, n.y, n.z]);
            self.uvs.extend_from_slice(&[uvs[i].0, uvs[i].1]);
            self.colors.extend_from_slice(&colors[i]);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
