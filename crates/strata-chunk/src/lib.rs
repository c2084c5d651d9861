//! Chunk storage: coordinates, voxels, chunks, and the owning chunk store.
#![forbid(unsafe_code)]

mod block;
mod chunk;
mod coord;
mod neighbors;
mod store;

pub use block::Block;
pub use chunk::{Chunk, ChunkError, ChunkGenState};
pub use coord::{CHUNK_SIZE, CHUNK_SIZE_I32, CHUNK_VOLUME, ChunkCoord, FACE_OFFSETS, split_world};
pub use neighbors::NeighborsLoaded;
pub use store::ChunkStore;
