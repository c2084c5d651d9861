use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strata_structures::DecorationParams;
use strata_world::WorldGenParams;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn ser_seed<S: Serializer>(seed: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(*seed as i64)
}

fn de_seed<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    i64::deserialize(d).map(|v| v as u64)
}

/// Engine tuning. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Diameter in chunks; the loaded cube has Chebyshev radius `render_distance / 2`.
    #[serde(default = "d_render_distance")]
    pub render_distance: u32,
    #[serde(default = "d_worker_count")]
    pub worker_count: usize,
    /// Staging entries dispatched per frame.
    #[serde(default = "d_stage_per_frame")]
    pub stage_per_frame: usize,
    /// Edit ray length in blocks.
    #[serde(default = "d_reach")]
    pub reach: f32,
    #[serde(default = "d_max_task_retries")]
    pub max_task_retries: u32,
    #[serde(
        default = "d_seed",
        serialize_with = "ser_seed",
        deserialize_with = "de_seed"
    )]
    pub seed: u64,
    #[serde(default)]
    pub worldgen: WorldGenParams,
    #[serde(default)]
    pub decoration: DecorationParams,
}
fn d_render_distance() -> u32 {
    8
}
fn d_worker_count() -> usize {
    4
}
fn d_stage_per_frame() -> usize {
    4
}
fn d_reach() -> f32 {
    8.0
}
fn d_max_task_retries() -> u32 {
    2
}
fn d_seed() -> u64 {
    1337
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_distance: d_render_distance(),
            worker_count: d_worker_count(),
            stage_per_frame: d_stage_per_frame(),
            reach: d_reach(),
            max_task_retries: d_max_task_retries(),
            seed: d_seed(),
            worldgen: WorldGenParams::default(),
            decoration: DecorationParams::default(),
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn radius(&self) -> i32 {
        (self.render_distance / 2) as i32
    }

    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_distance > 64 {
            return Err(ConfigError::Invalid {
                field: "render_distance",
                reason: format!("{} exceeds 64", self.render_distance),
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid {
                field: "worker_count",
                reason: "at least one worker is required".into(),
            });
        }
        if self.stage_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "stage_per_frame",
                reason: "must be positive".into(),
            });
        }
        if !(self.reach.is_finite() && self.reach > 0.0) {
            return Err(ConfigError::Invalid {
                field: "reach",
                reason: format!("{} is not a positive length", self.reach),
            });
        }
        self.worldgen.validate().map_err(|e| ConfigError::Invalid {
            field: "worldgen",
            reason: e.to_string(),
        })
    }
}
