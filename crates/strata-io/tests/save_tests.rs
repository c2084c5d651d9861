use proptest::prelude::*;
use strata_blocks::BlockType;
use strata_chunk::{Chunk, ChunkCoord, ChunkGenState};
use strata_geom::Vec3;
use strata_io::{SaveError, SaveRecord, SavedChunk};

fn edited_chunk(c: ChunkCoord) -> Chunk {
    let mut chunk = Chunk::new(c);
    chunk.set_kind(0, 0, 0, BlockType::Stone).unwrap();
    chunk.set_kind(15, 15, 15, BlockType::Wisp).unwrap();
    chunk.set_kind(3, 9, 12, BlockType::WoodLog).unwrap();
    chunk
}

#[test]
fn record_survives_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("strata-io-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("world.toml");

    let mut record = SaveRecord::new(1234, Vec3::new(8.5, 40.0, -3.25));
    record.put_chunk(&edited_chunk(ChunkCoord::new(-1, 2, 0)));
    record.save_to_path(&path).unwrap();

    let loaded = SaveRecord::load_from_path(&path).unwrap();
    assert_eq!(loaded, record);
    assert_eq!(loaded.observer_pos(), Vec3::new(8.5, 40.0, -3.25));

    let chunk = loaded.modified[0].to_chunk().unwrap();
    assert_eq!(chunk.coord(), ChunkCoord::new(-1, 2, 0));
    assert_eq!(chunk.state(), ChunkGenState::TerrainGenerated);
    assert_eq!(chunk.get_block(15, 15, 15).kind, BlockType::Wisp);
    assert_eq!(chunk.get_block(3, 9, 12).kind, BlockType::WoodLog);
    assert!(chunk.get_block(1, 1, 1).is_air());
    assert_eq!(chunk.get_block(0, 0, 0).pos, ChunkCoord::new(-1, 2, 0).origin());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn put_chunk_replaces_existing_entry() {
    let c = ChunkCoord::new(0, 0, 0);
    let mut record = SaveRecord::new(1, Vec3::ZERO);
    record.put_chunk(&Chunk::new(c));
    record.put_chunk(&edited_chunk(c));
    assert_eq!(record.modified.len(), 1);
    assert_eq!(record.modified[0], SavedChunk::from_chunk(&edited_chunk(c)));
}

#[test]
fn missing_file_and_bad_toml_are_errors() {
    let err = SaveRecord::load_from_path("/nonexistent/strata/save.toml").unwrap_err();
    assert!(matches!(err, SaveError::Io(_)));
    let err = SaveRecord::from_toml_str("seed = \"abc\"").unwrap_err();
    assert!(matches!(err, SaveError::Parse(_)));
}

#[test]
fn record_without_modified_chunks_parses() {
    let r = SaveRecord::from_toml_str("seed = 7\nobserver = [1.0, 2.0, 3.0]\n").unwrap();
    assert_eq!(r.seed, 7);
    assert!(r.modified.is_empty());
}

proptest! {
    // Saved chunks come back with the same kinds at the same cells, whatever
    // edits were made and whatever the seed's top bit is.
    #[test]
    fn saved_blocks_restore_in_place(
        seed in any::<u64>(),
        edits in proptest::collection::vec(
            (0..16i32, 0..16i32, 0..16i32, proptest::sample::select(BlockType::ALL.to_vec())),
            0..24,
        ),
    ) {
        let c = ChunkCoord::new(3, -2, 1);
        let mut chunk = Chunk::new(c);
        for (x, y, z, kind) in &edits {
            chunk.set_kind(*x, *y, *z, *kind).unwrap();
        }
        let mut record = SaveRecord::new(seed, Vec3::ZERO);
        record.put_chunk(&chunk);
        let text = record.to_toml_string().unwrap();
        let back = SaveRecord::from_toml_str(&text).unwrap();
        prop_assert_eq!(back.seed, seed);
        let restored = back.modified[0].to_chunk().unwrap();
        for (x, y, z, _) in &edits {
            prop_assert_eq!(restored.get_block(*x, *y, *z).kind, chunk.get_block(*x, *y, *z).kind);
        }
    }
}
