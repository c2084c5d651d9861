use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_blocks::Biome;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldGenError {
    #[error("failed to read worldgen config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse worldgen config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid worldgen parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldGenMode {
    /// Noise landmass with biome stacking.
    #[default]
    Noise,
    /// A grass-topped slab filling world y in `0..thickness`.
    Flat { thickness: i32 },
}

/// Fractal (FBm) sum settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    #[serde(default = "d_freq")]
    pub frequency: f32,
    #[serde(default = "d_oct")]
    pub octaves: i32,
    #[serde(default = "d_pers")]
    pub persistence: f32,
    #[serde(default = "d_lac")]
    pub lacunarity: f32,
}
fn d_freq() -> f32 {
    0.018
}
fn d_oct() -> i32 {
    4
}
fn d_pers() -> f32 {
    0.5
}
fn d_lac() -> f32 {
    2.0
}

impl Default for Fractal {
    fn default() -> Self {
        Self {
            frequency: d_freq(),
            octaves: d_oct(),
            persistence: d_pers(),
            lacunarity: d_lac(),
        }
    }
}

/// Value bands over the 2D biome noise (range -1..1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeBands {
    #[serde(default = "d_biome_freq")]
    pub frequency: f32,
    /// Noise below this is desert.
    #[serde(default = "d_desert_below")]
    pub desert_below: f32,
    /// Noise above this is snowlands; plains in between.
    #[serde(default = "d_snow_above")]
    pub snow_above: f32,
}
fn d_biome_freq() -> f32 {
    0.004
}
fn d_desert_below() -> f32 {
    -0.25
}
fn d_snow_above() -> f32 {
    0.3
}

impl Default for BiomeBands {
    fn default() -> Self {
        Self {
            frequency: d_biome_freq(),
            desert_below: d_desert_below(),
            snow_above: d_snow_above(),
        }
    }
}

impl BiomeBands {
    pub fn classify(&self, n: f32) -> Biome {
        if n < self.desert_below {
            Biome::Desert
        } else if n > self.snow_above {
            Biome::Snowlands
        } else {
            Biome::Plains
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldGenParams {
    #[serde(default)]
    pub mode: WorldGenMode,
    #[serde(default)]
    pub landmass: Fractal,
    /// Density above this is solid.
    #[serde(default = "d_threshold")]
    pub landmass_threshold: f32,
    /// World y where the falloff term is zero.
    #[serde(default = "d_base_height")]
    pub base_height: f32,
    /// Density lost per block of height above `base_height` (gained below).
    #[serde(default = "d_falloff")]
    pub height_falloff: f32,
    #[serde(default)]
    pub biomes: BiomeBands,
    #[serde(default = "d_subsurface")]
    pub subsurface_depth: i32,
}
fn d_threshold() -> f32 {
    0.0
}
fn d_base_height() -> f32 {
    8.0
}
fn d_falloff() -> f32 {
    0.025
}
fn d_subsurface() -> i32 {
    3
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self {
            mode: WorldGenMode::default(),
            landmass: Fractal::default(),
            landmass_threshold: d_threshold(),
            base_height: d_base_height(),
            height_falloff: d_falloff(),
            biomes: BiomeBands::default(),
            subsurface_depth: d_subsurface(),
        }
    }
}

impl WorldGenParams {
    pub fn flat(thickness: i32) -> Self {
        Self {
            mode: WorldGenMode::Flat { thickness },
            ..Self::default()
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self, WorldGenError> {
        let params: WorldGenParams = toml::from_str(src)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, WorldGenError> {
        let s = fs::read_to_string(path)?;
        let params = Self::from_toml_str(&s)?;
        log::info!(target: "worldgen", "loaded worldgen params from {}", path.display());
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), WorldGenError> {
        if self.subsurface_depth < 0 {
            return Err(WorldGenError::Invalid {
                field: "subsurface_depth",
                reason: format!("{} is negative", self.subsurface_depth),
            });
        }
        if self.landmass.octaves < 1 {
            return Err(WorldGenError::Invalid {
                field: "landmass.octaves",
                reason: format!("{} is below 1", self.landmass.octaves),
            });
        }
        if !(self.landmass.frequency > 0.0) {
            return Err(WorldGenError::Invalid {
                field: "landmass.frequency",
                reason: "must be positive".into(),
            });
        }
        if self.biomes.desert_below > self.biomes.snow_above {
            return Err(WorldGenError::Invalid {
                field: "biomes",
                reason: "desert_below is above snow_above".into(),
            });
        }
        Ok(())
    }
}
