//! Procedural terrain: worldgen parameters and the per-chunk generator.
#![forbid(unsafe_code)]

pub mod terrain;
pub mod worldgen;

pub use terrain::{GenCtx, chunk_seed, generate_chunk, noise_seed};
pub use worldgen::{BiomeBands, Fractal, WorldGenError, WorldGenMode, WorldGenParams};
