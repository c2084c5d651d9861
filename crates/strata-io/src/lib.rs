//! Save records for modified chunks.
#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strata_blocks::BlockType;
use strata_chunk::{Block, CHUNK_VOLUME, Chunk, ChunkCoord, ChunkError, ChunkGenState};
use strata_geom::Vec3;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode save: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("failed to parse save: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("saved chunk {coord:?} is malformed: {source}")]
    Chunk {
        coord: ChunkCoord,
        #[source]
        source: ChunkError,
    },
    #[error("saved chunk {coord:?} has block {index} at {found:?}, expected {expected:?}")]
    Misplaced {
        coord: ChunkCoord,
        index: usize,
        found: [i32; 3],
        expected: [i32; 3],
    },
}

// TOML integers are signed 64-bit; seeds round-trip through their bit pattern.
fn ser_seed<S: Serializer>(seed: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(*seed as i64)
}

fn de_seed<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    i64::deserialize(d).map(|v| v as u64)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBlock {
    pub kind: BlockType,
    pub pos: [i32; 3],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedChunk {
    pub coord: ChunkCoord,
    /// Flat scan order, `CHUNK_VOLUME` entries.
    pub blocks: Vec<SavedBlock>,
}

impl SavedChunk {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            coord: chunk.coord(),
            blocks: chunk
                .blocks()
                .iter()
                .map(|b| SavedBlock {
                    kind: b.kind,
                    pos: [b.pos.x, b.pos.y, b.pos.z],
                })
                .collect(),
        }
    }

    /// Rebuilds the chunk at `TerrainGenerated`; light and sky exposure are
    /// recomputed by the caller.
    pub fn to_chunk(&self) -> Result<Chunk, SaveError> {
        let origin = self.coord.origin();
        let mut blocks = Vec::with_capacity(CHUNK_VOLUME);
        for (i, sb) in self.blocks.iter().enumerate() {
            let (x, y, z) = Chunk::delinearize(i);
            let expected = origin.offset(x as i32, y as i32, z as i32);
            if sb.pos != [expected.x, expected.y, expected.z] {
                return Err(SaveError::Misplaced {
                    coord: self.coord,
                    index: i,
                    found: sb.pos,
                    expected: [expected.x, expected.y, expected.z],
                });
            }
            let mut b = Block::new(sb.kind, expected);
            b.in_landmass = !sb.kind.is_air();
            blocks.push(b);
        }
        let mut chunk = Chunk::from_blocks(self.coord, blocks).map_err(|source| SaveError::Chunk {
            coord: self.coord,
            source,
        })?;
        chunk.touch();
        chunk.advance_to(ChunkGenState::TerrainGenerated);
        Ok(chunk)
    }
}

/// Everything needed to resume a session: the world seed, where the
/// observer stood, and every chunk edited by hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(serialize_with = "ser_seed", deserialize_with = "de_seed")]
    pub seed: u64,
    pub observer: [f32; 3],
    #[serde(default)]
    pub modified: Vec<SavedChunk>,
}

impl SaveRecord {
    pub fn new(seed: u64, observer: Vec3) -> Self {
        Self {
            seed,
            observer: [observer.x, observer.y, observer.z],
            modified: Vec::new(),
        }
    }

    pub fn observer_pos(&self) -> Vec3 {
        Vec3::new(self.observer[0], self.observer[1], self.observer[2])
    }

    /// Adds or replaces the saved copy of a chunk.
    pub fn put_chunk(&mut self, chunk: &Chunk) {
        let saved = SavedChunk::from_chunk(chunk);
        match self.modified.iter_mut().find(|c| c.coord == saved.coord) {
            Some(slot) => *slot = saved,
            None => self.modified.push(saved),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, SaveError> {
        Ok(toml::to_string(self)?)
    }

    pub fn from_toml_str(src: &str) -> Result<Self, SaveError> {
        Ok(toml::from_str(src)?)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        fs::write(path, text)?;
        log::info!(
            target: "io",
            "saved {} modified chunk(s) to {}",
            self.modified.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let record = Self::from_toml_str(&text)?;
        log::info!(
            target: "io",
            "loaded save from {} ({} modified chunk(s))",
            path.display(),
            record.modified.len()
        );
        Ok(record)
    }
}
