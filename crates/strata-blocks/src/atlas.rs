use std::fs;
use std::path::Path;

use super::config::AtlasConfig;
use super::types::{BlockType, FaceRole};

/// Normalized texture rectangle inside the atlas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

const ROLE_COUNT: usize = 3;

#[inline]
fn role_index(role: FaceRole) -> usize {
    match role {
        FaceRole::Top => 0,
        FaceRole::Bottom => 1,
        FaceRole::Side => 2,
    }
}

/// UV lookup per block type and face role. Anything that cannot be resolved
/// maps to the error tile instead of failing.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    tiles_x: u32,
    tiles_y: u32,
    error_tile: u32,
    tiles: [[u32; ROLE_COUNT]; BlockType::COUNT],
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TextureAtlas {
    /// 4x4 grid with tile 15 reserved as the error texture.
    pub fn builtin() -> Self {
        let mut atlas = Self::uniform(4, 4, 15);
        let mut set = |kind: BlockType, top: u32, bottom: u32, side: u32| {
            atlas.tiles[kind.index()] = [top, bottom, side];
        };
        set(BlockType::Dirt, 0, 0, 0);
        set(BlockType::Grass, 1, 0, 2);
        set(BlockType::Stone, 3, 3, 3);
        set(BlockType::Sand, 4, 4, 4);
        set(BlockType::Snow, 5, 0, 6);
        set(BlockType::Wood, 7, 7, 7);
        set(BlockType::WoodLog, 8, 8, 9);
        set(BlockType::Leaves, 10, 10, 10);
        set(BlockType::Water, 11, 11, 11);
        set(BlockType::Wisp, 12, 12, 12);
        atlas
    }

    fn uniform(tiles_x: u32, tiles_y: u32, error_tile: u32) -> Self {
        Self {
            tiles_x: tiles_x.max(1),
            tiles_y: tiles_y.max(1),
            error_tile,
            tiles: [[error_tile; ROLE_COUNT]; BlockType::COUNT],
        }
    }

    pub fn from_config(cfg: &AtlasConfig) -> Self {
        let tiles_x = cfg.tiles_x.max(1);
        let tiles_y = cfg.tiles_y.max(1);
        let capacity = tiles_x * tiles_y;
        let error_tile = if cfg.error_tile < capacity {
            cfg.error_tile
        } else {
            log::warn!(
                "atlas error tile {} outside {}x{} grid; using 0",
                cfg.error_tile,
                tiles_x,
                tiles_y
            );
            0
        };
        let mut atlas = Self::uniform(tiles_x, tiles_y, error_tile);
        for (name, def) in &cfg.tiles {
            let Some(kind) = BlockType::from_name(name) else {
                log::warn!("atlas entry for unknown block `{}` ignored", name);
                continue;
            };
            let pick = |specific: Option<u32>| -> u32 {
                match specific.or(def.all) {
                    Some(t) if t < capacity => t,
                    Some(t) => {
                        log::warn!("atlas tile {} for `{}` out of range", t, name);
                        error_tile
                    }
                    None => error_tile,
                }
            };
            atlas.tiles[kind.index()] = [pick(def.top), pick(def.bottom), pick(def.side)];
        }
        for kind in BlockType::ALL {
            if kind.is_air() {
                continue;
            }
            if atlas.tiles[kind.index()].iter().all(|t| *t == error_tile) {
                log::warn!("no atlas tile for `{}`; using error texture", kind.name());
            }
        }
        atlas
    }

    pub fn from_toml_str(toml_str: &str) -> Self {
        match toml::from_str::<AtlasConfig>(toml_str) {
            Ok(cfg) => Self::from_config(&cfg),
            Err(e) => {
                log::warn!("invalid atlas config ({}); every block uses the error texture", e);
                Self::uniform(1, 1, 0)
            }
        }
    }

    /// Loads an atlas config, falling back to the error texture on any failure.
    pub fn load_or_fallback(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s),
            Err(e) => {
                log::warn!(
                    "failed to read atlas {:?} ({}); every block uses the error texture",
                    path,
                    e
                );
                Self::uniform(1, 1, 0)
            }
        }
    }

    #[inline]
    pub fn tile_for(&self, kind: BlockType, role: FaceRole) -> u32 {
        self.tiles[kind.index()][role_index(role)]
    }

    #[inline]
    pub fn error_tile(&self) -> u32 {
        self.error_tile
    }

    pub fn uv(&self, kind: BlockType, role: FaceRole) -> UvRect {
        self.tile_rect(self.tile_for(kind, role))
    }

    fn tile_rect(&self, tile: u32) -> UvRect {
        let col = tile % self.tiles_x;
        let row = tile / self.tiles_x;
        let w = 1.0 / self.tiles_x as f32;
        let h = 1.0 / self.tiles_y as f32;
        UvRect {
            u0: col as f32 * w,
            v0: row as f32 * h,
            u1: (col + 1) as f32 * w,
            v1: (row + 1) as f32 * h,
        }
    }
}
