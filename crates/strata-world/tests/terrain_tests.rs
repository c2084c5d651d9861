use proptest::prelude::*;
use strata_blocks::{Biome, BlockType};
use strata_chunk::{CHUNK_SIZE_I32, ChunkCoord};
use strata_world::{GenCtx, WorldGenParams, generate_chunk};

fn is_surface(kind: BlockType) -> bool {
    matches!(kind, BlockType::Grass | BlockType::Sand | BlockType::Snow)
}

#[test]
fn landmass_flag_matches_density() {
    let p = WorldGenParams::default();
    let ctx = GenCtx::new(9, &p);
    let c = generate_chunk(9, &p, ChunkCoord::new(0, 0, 0));
    for b in c.blocks() {
        assert_eq!(b.in_landmass, ctx.is_landmass(b.pos.x, b.pos.y, b.pos.z));
        assert_eq!(b.is_air(), !b.in_landmass);
    }
}

#[test]
fn stacking_is_seamless_across_vertical_boundary() {
    let p = WorldGenParams::default();
    let seed = 77;
    let depth = p.subsurface_depth;
    for (cx, cz) in [(0, 0), (3, -2), (-5, 4)] {
        let lower = generate_chunk(seed, &p, ChunkCoord::new(cx, 0, cz));
        let upper = generate_chunk(seed, &p, ChunkCoord::new(cx, 1, cz));
        for lz in 0..CHUNK_SIZE_I32 {
            for lx in 0..CHUNK_SIZE_I32 {
                // Column over both chunks, top first.
                let column: Vec<BlockType> = (0..CHUNK_SIZE_I32)
                    .rev()
                    .map(|y| upper.get_block(lx, y, lz).kind)
                    .chain((0..CHUNK_SIZE_I32).rev().map(|y| lower.get_block(lx, y, lz).kind))
                    .collect();
                let mut run: Option<i32> = None;
                for kind in column {
                    if kind.is_air() {
                        run = Some(0);
                        continue;
                    }
                    if let Some(r) = run {
                        if r == 0 {
                            assert!(is_surface(kind), "expected surface, got {kind:?}");
                        } else if r > depth {
                            assert_eq!(kind, BlockType::Stone);
                        } else {
                            assert!(!is_surface(kind) || kind == BlockType::Sand);
                            assert_ne!(kind, BlockType::Stone);
                        }
                        run = Some(r + 1);
                    }
                }
            }
        }
    }
}

#[test]
fn landmass_cells_carry_column_biome() {
    let p = WorldGenParams::default();
    let ctx = GenCtx::new(5, &p);
    let c = generate_chunk(5, &p, ChunkCoord::new(2, 0, 2));
    for b in c.blocks().iter().filter(|b| b.in_landmass) {
        let biome = ctx.biome_at(b.pos.x, b.pos.z);
        assert_ne!(biome, Biome::None);
        assert_eq!(b.biome, biome);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn generation_is_deterministic(seed in any::<u64>(), cx in -20i32..20, cy in -2i32..2, cz in -20i32..20) {
        let p = WorldGenParams::default();
        let coord = ChunkCoord::new(cx, cy, cz);
        let a = generate_chunk(seed, &p, coord);
        let b = generate_chunk(seed, &p, coord);
        prop_assert_eq!(a.blocks(), b.blocks());
        prop_assert_eq!(a.version(), b.version());
    }
}
