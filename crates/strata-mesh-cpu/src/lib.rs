//! CPU meshing: face-culled chunk meshes for the opaque and transparent passes.
#![forbid(unsafe_code)]

mod build;
mod constants;
mod face;
mod mesh_build;
mod padded;

pub use build::{ChunkMeshes, build_chunk_mesh, build_chunk_meshes};
pub use constants::{OPAQUE_ALPHA, TRANSPARENT_ALPHA, VISUAL_LIGHT_MIN};
pub use face::Face;
pub use mesh_build::{MeshData, MeshPass};
