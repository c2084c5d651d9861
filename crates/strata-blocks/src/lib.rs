//! Block types, the block catalog, and texture atlas lookups.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod config;
pub mod registry;
pub mod types;

pub use atlas::{TextureAtlas, UvRect};
pub use registry::{BlockCatalog, BlockInfo, CatalogError, UNBREAKABLE_HARDNESS};
pub use types::{Biome, BlockType, FaceRole};
