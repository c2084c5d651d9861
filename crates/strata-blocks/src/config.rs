use serde::Deserialize;
use hashbrown::HashMap;

// Top-level blocks override file: `[blocks.<name>]` tables on top of the builtin catalog.
#[derive(Deserialize, Debug, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: HashMap<String, BlockDef>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlockDef {
    #[serde(default)]
    pub hardness: Option<u8>,
    #[serde(default)]
    pub thickness: Option<f32>,
    #[serde(default)]
    pub max_stack: Option<u16>,
    #[serde(default)]
    pub transparent: Option<bool>,
    #[serde(default)]
    pub emission: Option<u8>,
}

// Atlas layout: a regular grid of `tiles_x * tiles_y` tiles addressed row-major.
#[derive(Deserialize, Debug, Clone)]
pub struct AtlasConfig {
    pub tiles_x: u32,
    pub tiles_y: u32,
    #[serde(default)]
    pub error_tile: u32,
    #[serde(default)]
    pub tiles: HashMap<String, TileDef>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TileDef {
    #[serde(default)]
    pub all: Option<u32>,
    #[serde(default)]
    pub top: Option<u32>,
    #[serde(default)]
    pub bottom: Option<u32>,
    #[serde(default)]
    pub side: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_tables_deserialize_by_name() {
        let cfg: BlocksConfig = toml::from_str(
            r#"
            [blocks.stone]
            hardness = 7
            [blocks.wisp]
            emission = 12
            transparent = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.blocks.len(), 2);
        assert_eq!(cfg.blocks["stone"].hardness, Some(7));
        assert_eq!(cfg.blocks["wisp"].emission, Some(12));
        assert!(cfg.blocks["stone"].emission.is_none());

        let atlas: AtlasConfig = toml::from_str(
            r#"
            tiles_x = 4
            tiles_y = 4
            [tiles.grass]
            top = 1
            side = 2
            "#,
        )
        .unwrap();
        assert_eq!(atlas.error_tile, 0);
        assert_eq!(atlas.tiles["grass"].top, Some(1));
        assert!(atlas.tiles.get("sand").is_none());
    }
}
