use fastnoise_lite::{FastNoiseLite, NoiseType};
use strata_blocks::{Biome, BlockType};
use strata_chunk::{CHUNK_SIZE_I32, Chunk, ChunkCoord, ChunkGenState};

use crate::worldgen::{Fractal, WorldGenMode, WorldGenParams};

/// Seed for all per-chunk randomness (decorations). Terrain noise itself
/// samples world coordinates with the world seed so it stays continuous.
#[inline]
pub fn chunk_seed(seed: u64, coord: ChunkCoord) -> u64 {
    seed ^ (coord.cx as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (coord.cy as i64 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (coord.cz as i64 as u64).wrapping_mul(0x1656_67B1_9E37_79F9)
}

/// Folds a 64-bit world seed into the 32-bit seed FastNoiseLite takes.
#[inline]
pub fn noise_seed(seed: u64) -> i32 {
    (seed ^ (seed >> 32)) as u32 as i32
}

/// Noise state for one generation call. Built per call and never shared
/// between tasks.
pub struct GenCtx<'a> {
    landmass: FastNoiseLite,
    biome: FastNoiseLite,
    params: &'a WorldGenParams,
}

impl<'a> GenCtx<'a> {
    pub fn new(seed: u64, params: &'a WorldGenParams) -> Self {
        let s = noise_seed(seed);
        let mut landmass = FastNoiseLite::with_seed(s);
        landmass.set_noise_type(Some(NoiseType::OpenSimplex2));
        landmass.set_frequency(Some(params.landmass.frequency));
        let mut biome = FastNoiseLite::with_seed(s ^ 0x1203_5F31);
        biome.set_noise_type(Some(NoiseType::OpenSimplex2));
        biome.set_frequency(Some(params.biomes.frequency));
        Self {
            landmass,
            biome,
            params,
        }
    }

    fn fractal3(n: &FastNoiseLite, f: &Fractal, x: f32, y: f32, z: f32) -> f32 {
        let mut amp = 1.0_f32;
        let mut freq = 1.0_f32;
        let mut sum = 0.0_f32;
        let mut max_amp = 0.0_f32;
        for _ in 0..f.octaves.max(1) {
            sum += n.get_noise_3d(x * freq, y * freq, z * freq) * amp;
            max_amp += amp;
            amp *= f.persistence;
            freq *= f.lacunarity;
        }
        if max_amp > 0.0 { sum / max_amp } else { sum }
    }

    /// Landmass density; solid where it exceeds `landmass_threshold`.
    pub fn density(&self, x: i32, y: i32, z: i32) -> f32 {
        let (fx, fy, fz) = (x as f32, y as f32, z as f32);
        let n = Self::fractal3(&self.landmass, &self.params.landmass, fx, fy, fz);
        n - (fy - self.params.base_height) * self.params.height_falloff
    }

    #[inline]
    pub fn is_landmass(&self, x: i32, y: i32, z: i32) -> bool {
        self.density(x, y, z) > self.params.landmass_threshold
    }

    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        let n = self.biome.get_noise_2d(x as f32, z as f32);
        self.params.biomes.classify(n)
    }
}

/// Generates terrain for `coord`. A pure function of its inputs; the result
/// is at `TerrainGenerated` with light and sky exposure still zeroed.
pub fn generate_chunk(seed: u64, params: &WorldGenParams, coord: ChunkCoord) -> Chunk {
    let mut chunk = Chunk::new(coord);
    match params.mode {
        WorldGenMode::Flat { thickness } => fill_flat(&mut chunk, thickness, params.subsurface_depth),
        WorldGenMode::Noise => fill_noise(&mut chunk, &GenCtx::new(seed, params)),
    }
    chunk.touch();
    chunk.advance_to(ChunkGenState::TerrainGenerated);
    chunk
}

fn fill_flat(chunk: &mut Chunk, thickness: i32, depth: i32) {
    let top = thickness - 1;
    for b in chunk.blocks_mut() {
        let y = b.pos.y;
        if y < 0 || y > top {
            continue;
        }
        b.kind = if y == top {
            Biome::Plains.surface_block()
        } else if y >= top - depth {
            Biome::Plains.subsurface_block()
        } else {
            BlockType::Stone
        };
        b.biome = Biome::Plains;
        b.in_landmass = true;
    }
}

fn fill_noise(chunk: &mut Chunk, ctx: &GenCtx<'_>) {
    let depth = ctx.params.subsurface_depth.max(0);
    let origin = chunk.origin();
    let top = origin.y + CHUNK_SIZE_I32 - 1;
    // Stacking depends only on the `depth + 1` cells above, so starting the
    // scan that far above the chunk makes it seamless with the chunk above.
    let scan_from = top + depth + 1;
    for lz in 0..CHUNK_SIZE_I32 {
        for lx in 0..CHUNK_SIZE_I32 {
            let (wx, wz) = (origin.x + lx, origin.z + lz);
            let biome = ctx.biome_at(wx, wz);
            let mut since_air = depth + 1;
            for wy in (origin.y..=scan_from).rev() {
                if !ctx.is_landmass(wx, wy, wz) {
                    since_air = 0;
                    continue;
                }
                let kind = if since_air == 0 {
                    biome.surface_block()
                } else if since_air <= depth {
                    biome.subsurface_block()
                } else {
                    BlockType::Stone
                };
                since_air = since_air.saturating_add(1).min(depth + 1);
                if wy > top {
                    continue;
                }
                let i = Chunk::index(lx as usize, (wy - origin.y) as usize, lz as usize);
                let b = &mut chunk.blocks_mut()[i];
                b.kind = kind;
                b.biome = biome;
                b.in_landmass = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_seed_mixes_each_axis() {
        let s = 42;
        let a = chunk_seed(s, ChunkCoord::new(0, 0, 0));
        assert_eq!(a, s);
        let xs = chunk_seed(s, ChunkCoord::new(1, 0, 0));
        let ys = chunk_seed(s, ChunkCoord::new(0, 1, 0));
        let zs = chunk_seed(s, ChunkCoord::new(0, 0, 1));
        assert!(xs != ys && ys != zs && xs != zs);
        assert_ne!(chunk_seed(s, ChunkCoord::new(-1, 0, 0)), xs);
    }

    #[test]
    fn flat_mode_layers() {
        let p = WorldGenParams::flat(6);
        let c = generate_chunk(1, &p, ChunkCoord::new(0, 0, 0));
        assert_eq!(c.state(), ChunkGenState::TerrainGenerated);
        assert_eq!(c.get_block(3, 5, 3).kind, BlockType::Grass);
        for y in 2..5 {
            assert_eq!(c.get_block(3, y, 3).kind, BlockType::Dirt);
        }
        assert_eq!(c.get_block(3, 1, 3).kind, BlockType::Stone);
        assert!(c.get_block(3, 6, 3).is_air());
        let below = generate_chunk(1, &p, ChunkCoord::new(0, -1, 0));
        assert!(below.is_all_air());
    }

    #[test]
    fn falloff_gives_terrain_a_top_and_bottom() {
        let p = WorldGenParams::default();
        let sky = generate_chunk(3, &p, ChunkCoord::new(0, 8, 0));
        assert!(sky.is_all_air());
        let deep = generate_chunk(3, &p, ChunkCoord::new(0, -8, 0));
        assert!(deep.blocks().iter().all(|b| b.kind == BlockType::Stone && b.in_landmass));
    }
}
