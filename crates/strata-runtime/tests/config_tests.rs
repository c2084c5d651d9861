use proptest::prelude::*;
use strata_runtime::{ConfigError, EngineConfig};

#[test]
fn config_file_round_trips_through_disk() {
    let dir = std::env::temp_dir().join(format!("strata-runtime-cfg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("engine.toml");
    std::fs::write(&path, "render_distance = 6\nstage_per_frame = 2\nreach = 5.5\n").unwrap();
    let cfg = EngineConfig::load_from_path(&path).unwrap();
    assert_eq!(cfg.radius(), 3);
    assert_eq!(cfg.stage_per_frame, 2);
    assert_eq!(cfg.reach, 5.5);
    assert!(matches!(
        EngineConfig::load_from_path(dir.join("missing.toml")),
        Err(ConfigError::Io(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn bad_reach_is_rejected() {
    assert!(matches!(
        EngineConfig::from_toml_str("reach = -1.0"),
        Err(ConfigError::Invalid { field: "reach", .. })
    ));
    assert!(matches!(
        EngineConfig::from_toml_str("render_distance = \"far\""),
        Err(ConfigError::Parse(_))
    ));
}

proptest! {
    #[test]
    fn radius_is_half_the_render_distance(rd in 0u32..=64, workers in 1usize..16) {
        let src = format!("render_distance = {rd}\nworker_count = {workers}\n");
        let cfg = EngineConfig::from_toml_str(&src).unwrap();
        let r = cfg.radius() as u32;
        prop_assert!(2 * r <= rd && rd < 2 * r + 2);
        prop_assert_eq!(cfg.worker_count, workers);
    }
}

#[test]
fn shipped_assets_parse() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
    let cfg = EngineConfig::load_from_path(root.join("engine.toml")).unwrap();
    assert_eq!(cfg, EngineConfig::default());
    let catalog = strata_blocks::BlockCatalog::load_from_path(root.join("blocks.toml")).unwrap();
    assert!(catalog.is_transparent_solid(strata_blocks::BlockType::Leaves));
    let atlas = strata_blocks::TextureAtlas::load_or_fallback(root.join("atlas.toml"));
    assert_eq!(atlas.error_tile(), 15);
}
