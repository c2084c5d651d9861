use proptest::prelude::*;
use strata_blocks::{BlockCatalog, BlockType, TextureAtlas};
use strata_chunk::{Chunk, ChunkCoord, ChunkStore};
use strata_geom::Vec3;
use strata_lighting::relight_chunk;
use strata_mesh_cpu::{
    MeshPass, OPAQUE_ALPHA, TRANSPARENT_ALPHA, VISUAL_LIGHT_MIN, build_chunk_mesh,
    build_chunk_meshes,
};

fn faces(store: &ChunkStore, c: ChunkCoord, pass: MeshPass) -> usize {
    build_chunk_mesh(store, c, &BlockCatalog::builtin(), &TextureAtlas::builtin(), pass, None)
        .face_count()
}

fn store_with(blocks: &[(ChunkCoord, (i32, i32, i32), BlockType)]) -> ChunkStore {
    let mut store = ChunkStore::new();
    for &(c, (x, y, z), kind) in blocks {
        if !store.contains(c) {
            store.insert(Chunk::new(c));
        }
        store.get_mut(c).unwrap().set_kind(x, y, z, kind).unwrap();
    }
    store
}

const C: ChunkCoord = ChunkCoord::new(0, 0, 0);

#[test]
fn lone_block_has_six_faces() {
    let store = store_with(&[(C, (4, 4, 4), BlockType::Stone)]);
    let m = build_chunk_mesh(
        &store,
        C,
        &BlockCatalog::builtin(),
        &TextureAtlas::builtin(),
        MeshPass::Opaque,
        None,
    );
    assert_eq!(m.face_count(), 6);
    assert_eq!(m.vertex_count(), 24);
    assert_eq!(m.indices.len(), 36);
    assert_eq!(m.normals.len(), 24 * 3);
    assert_eq!(m.uvs.len(), 24 * 2);
    assert_eq!(m.colors.len(), 24 * 4);
    assert!(m.colors.chunks(4).all(|c| c[3] == OPAQUE_ALPHA));
}

#[test]
fn shared_face_is_culled() {
    let store = store_with(&[
        (C, (4, 4, 4), BlockType::Stone),
        (C, (5, 4, 4), BlockType::Dirt),
    ]);
    assert_eq!(faces(&store, C, MeshPass::Opaque), 10);
}

#[test]
fn boundary_face_depends_on_neighbor_chunk() {
    let east = ChunkCoord::new(1, 0, 0);
    let mut store = store_with(&[(C, (15, 0, 0), BlockType::Stone)]);
    // Missing neighbor: boundary face drawn.
    assert_eq!(faces(&store, C, MeshPass::Opaque), 6);
    store.insert(Chunk::new(east));
    assert_eq!(faces(&store, C, MeshPass::Opaque), 6);
    store.get_mut(east).unwrap().set_kind(0, 0, 0, BlockType::Stone).unwrap();
    assert_eq!(faces(&store, C, MeshPass::Opaque), 5);
    assert_eq!(faces(&store, east, MeshPass::Opaque), 5);
}

#[test]
fn solid_chunk_surrounded_by_solid_has_no_faces() {
    let fill = |c: ChunkCoord| {
        let mut ch = Chunk::new(c);
        for b in ch.blocks_mut() {
            b.kind = BlockType::Stone;
        }
        ch
    };
    let mut store = ChunkStore::new();
    store.insert(fill(C));
    assert_eq!(faces(&store, C, MeshPass::Opaque), 6 * 256);
    for n in C.face_neighbors() {
        store.insert(fill(n));
    }
    assert_eq!(faces(&store, C, MeshPass::Opaque), 0);
}

#[test]
fn passes_never_occlude_each_other() {
    let store = store_with(&[
        (C, (4, 4, 4), BlockType::Stone),
        (C, (5, 4, 4), BlockType::Water),
        (C, (6, 4, 4), BlockType::Water),
        (C, (4, 5, 4), BlockType::Leaves),
    ]);
    assert_eq!(faces(&store, C, MeshPass::Opaque), 6);
    // Two waters share a face; leaves are separate.
    assert_eq!(faces(&store, C, MeshPass::Transparent), 10 + 6);
    let meshes = build_chunk_meshes(
        &store,
        C,
        &BlockCatalog::builtin(),
        &TextureAtlas::builtin(),
        None,
    );
    assert!(meshes.transparent.colors.chunks(4).all(|c| c[3] == TRANSPARENT_ALPHA));
    assert_eq!(meshes.opaque.face_count(), 6);
}

#[test]
fn air_only_chunk_is_empty_and_missing_chunk_yields_nothing() {
    let mut store = ChunkStore::new();
    store.insert(Chunk::new(C));
    assert!(build_chunk_meshes(&store, C, &BlockCatalog::builtin(), &TextureAtlas::builtin(), None)
        .opaque
        .is_empty());
    assert_eq!(faces(&store, ChunkCoord::new(9, 9, 9), MeshPass::Opaque), 0);
}

#[test]
fn vertex_colors_follow_light_with_floor() {
    let catalog = BlockCatalog::builtin();
    let mut store = store_with(&[(C, (4, 4, 4), BlockType::Stone)]);
    // Dark: light never computed.
    let dark = build_chunk_mesh(&store, C, &catalog, &TextureAtlas::builtin(), MeshPass::Opaque, None);
    assert!(dark.colors.chunks(4).all(|c| c[0] == VISUAL_LIGHT_MIN));
    relight_chunk(&mut store, &catalog, C);
    let lit = build_chunk_mesh(&store, C, &catalog, &TextureAtlas::builtin(), MeshPass::Opaque, None);
    // Seven sky-lit cells and the stone itself share each corner: 7*15/8.
    let want = ((7.0 * 15.0 / 8.0) / 15.0 * 255.0_f32).round() as u8;
    assert!(lit.colors.chunks(4).all(|c| c[0] == want), "{:?}", &lit.colors[..8]);
}

#[test]
fn transparent_faces_are_sorted_back_to_front() {
    let mut blocks = Vec::new();
    for (i, x) in [1, 5, 9, 13].into_iter().enumerate() {
        blocks.push((C, (x, 2 + i as i32, 3), BlockType::Water));
    }
    let store = store_with(&blocks);
    let cam = Vec3::new(0.5, 3.0, 20.0);
    let m = build_chunk_mesh(
        &store,
        C,
        &BlockCatalog::builtin(),
        &TextureAtlas::builtin(),
        MeshPass::Transparent,
        Some(cam),
    );
    assert_eq!(m.face_count(), 24);
    let d: Vec<f32> = (0..m.face_count())
        .map(|f| (m.face_centroid(f).unwrap() - cam).length_sq())
        .collect();
    assert!(d.windows(2).all(|w| w[0] >= w[1]), "{d:?}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn face_count_matches_exposed_sides(cells in proptest::collection::hash_set((0i32..16, 0i32..16, 0i32..16), 1..40)) {
        let blocks: Vec<_> = cells.iter().map(|&p| (C, p, BlockType::Stone)).collect();
        let store = store_with(&blocks);
        let mut expected = 0;
        for &(x, y, z) in &cells {
            for (dx, dy, dz) in [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)] {
                if !cells.contains(&(x + dx, y + dy, z + dz)) {
                    expected += 1;
                }
            }
        }
        prop_assert_eq!(faces(&store, C, MeshPass::Opaque), expected);
    }
}
