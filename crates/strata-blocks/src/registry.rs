use std::fs;
use std::path::Path;

use thiserror::Error;

use super::config::{BlockDef, BlocksConfig};
use super::types::BlockType;

/// Hardness value that marks a block as unbreakable.
pub const UNBREAKABLE_HARDNESS: u8 = 10;
pub const MAX_LIGHT: u8 = 15;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockInfo {
    pub hardness: u8,
    /// Movement drag in `[0, 1]`.
    pub thickness: f32,
    pub max_stack: u16,
    pub is_transparent: bool,
    pub light_emission: u8,
}

impl BlockInfo {
    const fn new(
        hardness: u8,
        thickness: f32,
        max_stack: u16,
        is_transparent: bool,
        light_emission: u8,
    ) -> Self {
        Self {
            hardness,
            thickness,
            max_stack,
            is_transparent,
            light_emission,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read block catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse block catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown block type `{0}`")]
    UnknownBlock(String),
    #[error("block `{name}`: {field} out of range ({value})")]
    OutOfRange {
        name: String,
        field: &'static str,
        value: String,
    },
}

/// Immutable per-type properties, indexed by [`BlockType::index`].
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    infos: [BlockInfo; BlockType::COUNT],
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BlockCatalog {
    pub fn builtin() -> Self {
        let mut infos = [BlockInfo::new(0, 0.0, 0, true, 0); BlockType::COUNT];
        for kind in BlockType::ALL {
            infos[kind.index()] = match kind {
                BlockType::Air => BlockInfo::new(0, 0.0, 0, true, 0),
                BlockType::Dirt => BlockInfo::new(1, 1.0, 64, false, 0),
                BlockType::Grass => BlockInfo::new(1, 1.0, 64, false, 0),
                BlockType::Stone => BlockInfo::new(3, 1.0, 64, false, 0),
                BlockType::Sand => BlockInfo::new(1, 1.0, 64, false, 0),
                BlockType::Snow => BlockInfo::new(1, 1.0, 64, false, 0),
                BlockType::Wood => BlockInfo::new(2, 1.0, 64, false, 0),
                BlockType::WoodLog => BlockInfo::new(2, 1.0, 64, false, 0),
                BlockType::Leaves => BlockInfo::new(1, 1.0, 64, true, 0),
                BlockType::Water => BlockInfo::new(UNBREAKABLE_HARDNESS, 0.5, 1, true, 0),
                BlockType::Wisp => BlockInfo::new(0, 0.0, 16, true, MAX_LIGHT),
            };
        }
        Self { infos }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, CatalogError> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();
        // Sort so the first reported error is stable regardless of map order.
        let mut defs: Vec<(String, BlockDef)> = cfg.blocks.into_iter().collect();
        defs.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, def) in defs {
            let kind = BlockType::from_name(&name)
                .ok_or_else(|| CatalogError::UnknownBlock(name.clone()))?;
            let info = &mut catalog.infos[kind.index()];
            if let Some(h) = def.hardness {
                if h > UNBREAKABLE_HARDNESS {
                    return Err(out_of_range(&name, "hardness", h));
                }
                info.hardness = h;
            }
            if let Some(t) = def.thickness {
                if !(0.0..=1.0).contains(&t) {
                    return Err(out_of_range(&name, "thickness", t));
                }
                info.thickness = t;
            }
            if let Some(s) = def.max_stack {
                info.max_stack = s;
            }
            if let Some(tr) = def.transparent {
                if kind.is_air() && !tr {
                    return Err(out_of_range(&name, "transparent", tr));
                }
                info.is_transparent = tr;
            }
            if let Some(e) = def.emission {
                if e > MAX_LIGHT {
                    return Err(out_of_range(&name, "emission", e));
                }
                info.light_emission = e;
            }
        }
        Ok(catalog)
    }

    #[inline]
    pub fn info(&self, kind: BlockType) -> &BlockInfo {
        &self.infos[kind.index()]
    }

    #[inline]
    pub fn emission(&self, kind: BlockType) -> u8 {
        self.infos[kind.index()].light_emission
    }

    /// Occludes faces in the opaque pass and blocks sky light.
    #[inline]
    pub fn is_opaque(&self, kind: BlockType) -> bool {
        !kind.is_air() && !self.infos[kind.index()].is_transparent
    }

    /// Non-air block rendered in the transparent pass.
    #[inline]
    pub fn is_transparent_solid(&self, kind: BlockType) -> bool {
        !kind.is_air() && self.infos[kind.index()].is_transparent
    }

    /// Light flows through air and transparent blocks, except leaves which keep
    /// canopies dark.
    #[inline]
    pub fn conducts_light(&self, kind: BlockType) -> bool {
        match kind {
            BlockType::Air => true,
            BlockType::Leaves => false,
            _ => self.infos[kind.index()].is_transparent,
        }
    }

    #[inline]
    pub fn is_breakable(&self, kind: BlockType) -> bool {
        !kind.is_air() && self.infos[kind.index()].hardness < UNBREAKABLE_HARDNESS
    }
}

fn out_of_range(name: &str, field: &'static str, value: impl ToString) -> CatalogError {
    CatalogError::OutOfRange {
        name: name.to_string(),
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_matches_block_roles() {
        let c = BlockCatalog::builtin();
        assert!(c.is_opaque(BlockType::Stone));
        assert!(!c.is_opaque(BlockType::Air));
        assert!(!c.is_opaque(BlockType::Water));
        assert!(c.is_transparent_solid(BlockType::Leaves));
        assert!(!c.is_transparent_solid(BlockType::Air));
        assert!(!c.conducts_light(BlockType::Leaves));
        assert!(c.conducts_light(BlockType::Water));
        assert!(c.conducts_light(BlockType::Air));
        assert!(!c.conducts_light(BlockType::Dirt));
        assert!(!c.is_breakable(BlockType::Water));
        assert!(c.is_breakable(BlockType::Grass));
        assert_eq!(c.emission(BlockType::Wisp), MAX_LIGHT);
    }

    #[test]
    fn overrides_apply_on_top_of_builtin() {
        let c = BlockCatalog::from_toml_str(
            r#"
            [blocks.stone]
            hardness = 10
            [blocks.wood_log]
            emission = 4
        "#,
        )
        .unwrap();
        assert!(!c.is_breakable(BlockType::Stone));
        assert_eq!(c.emission(BlockType::WoodLog), 4);
        assert_eq!(c.info(BlockType::Dirt).hardness, 1);
    }

    #[test]
    fn rejects_unknown_names_and_bad_ranges() {
        let err = BlockCatalog::from_toml_str("[blocks.obsidian]\nhardness = 3\n").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownBlock(ref n) if n == "obsidian"));
        let err = BlockCatalog::from_toml_str("[blocks.sand]\nemission = 16\n").unwrap_err();
        assert!(matches!(err, CatalogError::OutOfRange { field: "emission", .. }));
        let err = BlockCatalog::from_toml_str("[blocks.air]\ntransparent = false\n").unwrap_err();
        assert!(matches!(err, CatalogError::OutOfRange { field: "transparent", .. }));
    }
}
