use std::time::{Duration, Instant};

use strata_blocks::BlockType;
use strata_chunk::{ChunkCoord, ChunkGenState};
use strata_edit::EditError;
use strata_geom::{Aabb, IVec3, Vec3};
use strata_io::{SaveRecord, SavedChunk};
use strata_mesh_cpu::MeshPass;
use strata_runtime::{Engine, EngineConfig, EngineError, StreamStats};
use strata_structures::DecorationParams;
use strata_world::WorldGenParams;

const DOWN: Vec3 = Vec3::new(0.0, -1.0, 0.0);
const EYE: Vec3 = Vec3::new(8.5, 10.0, 8.5);
const EAST: Vec3 = Vec3::new(1.0, 0.0, 0.0);

fn flat_config() -> EngineConfig {
    EngineConfig {
        render_distance: 2,
        worker_count: 2,
        stage_per_frame: 8,
        worldgen: WorldGenParams::flat(4),
        decoration: DecorationParams {
            tree_chance: 0.0,
            wisp_chance: 0.0,
            ..DecorationParams::default()
        },
        ..EngineConfig::default()
    }
}

fn pump(engine: &mut Engine, eye: Vec3) -> StreamStats {
    let deadline = Instant::now() + Duration::from_secs(60);
    loop {
        engine.update(eye, DOWN);
        let stats = engine.stats();
        if stats.is_settled() || Instant::now() > deadline {
            return stats;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn opaque_faces(engine: &Engine, c: ChunkCoord) -> usize {
    engine
        .backend()
        .resident(c, MeshPass::Opaque)
        .map_or(0, |h| h.faces)
}

#[test]
fn streams_the_radius_and_unloads_behind_the_observer() {
    let mut engine = Engine::headless(flat_config()).unwrap();
    let stats = pump(&mut engine, EYE);
    assert!(stats.is_settled(), "{stats}");
    let center = ChunkCoord::new(0, 0, 0);
    assert_eq!(engine.store().len(), 27);
    for c in center.cube_around(1) {
        let chunk = engine.store().get(c).unwrap();
        assert_eq!(chunk.state(), ChunkGenState::DecorationsAndRemeshDone, "{c:?}");
    }
    // Only the slab row has geometry.
    assert_eq!(engine.backend().resident_coords().len(), 9);

    let far = EYE + Vec3::new(48.0, 0.0, 0.0);
    let stats = pump(&mut engine, far);
    assert!(stats.is_settled(), "{stats}");
    let center = ChunkCoord::new(3, 0, 0);
    assert_eq!(engine.store().len(), 27);
    assert!(engine.store().coords().all(|c| c.chebyshev(center) <= 1));
    assert!(engine.backend().releases() >= 9);
    assert!(
        engine
            .backend()
            .resident_coords()
            .into_iter()
            .all(|c| c.chebyshev(center) <= 1)
    );
}

#[test]
fn place_then_break_updates_the_mesh_in_place() {
    let mut engine = Engine::headless(flat_config()).unwrap();
    pump(&mut engine, EYE);
    let c0 = ChunkCoord::new(0, 0, 0);
    let before = opaque_faces(&engine, c0);
    assert!(before > 0);

    let hit = engine.selection().unwrap();
    assert_eq!(hit.block, IVec3::new(8, 3, 8));
    assert_eq!(hit.normal, IVec3::new(0, 1, 0));
    let out = engine.place_selected(BlockType::Stone).unwrap();
    assert_eq!(out.pos, IVec3::new(8, 4, 8));
    assert_eq!(out.coord, c0);
    assert!(engine.modified().contains(c0));
    assert_eq!(
        engine.store().block_at_world(out.pos).unwrap().kind,
        BlockType::Stone
    );
    // Six new faces, minus the stone bottom and the grass top it covers.
    assert_eq!(opaque_faces(&engine, c0), before + 4);

    assert_eq!(engine.selection().unwrap().block, IVec3::new(8, 4, 8));
    engine.break_selected().unwrap();
    assert_eq!(opaque_faces(&engine, c0), before);
    let stats = pump(&mut engine, EYE);
    assert!(stats.is_settled(), "{stats}");
}

fn light_at(engine: &Engine, p: IVec3) -> u8 {
    engine.store().block_at_world(p).unwrap().light
}

#[test]
fn breaking_an_emitter_darkens_the_neighbor_chunk() {
    let mut engine = Engine::headless(flat_config()).unwrap();
    pump(&mut engine, EYE);

    // Hollow a sealed pocket in the slab across the x=16 chunk face.
    let inside = Vec3::new(15.5, 1.5, 8.5);
    let near = IVec3::new(15, 1, 8);
    let far = IVec3::new(16, 1, 8);
    engine.update(inside, EAST);
    assert_eq!(engine.selection().unwrap().block, near);
    engine.break_selected().unwrap();
    assert_eq!(engine.selection().unwrap().block, far);
    engine.break_selected().unwrap();
    assert_eq!((light_at(&engine, near), light_at(&engine, far)), (0, 0));

    let out = engine.place_selected(BlockType::Wisp).unwrap();
    assert_eq!(out.pos, far);
    assert_eq!(out.coord, ChunkCoord::new(1, 0, 0));
    assert_eq!((light_at(&engine, near), light_at(&engine, far)), (14, 15));
    let stats = pump(&mut engine, inside);
    assert!(stats.is_settled(), "{stats}");
    assert_eq!(light_at(&engine, near), 14);

    engine.update(inside, EAST);
    let out = engine.break_selected().unwrap();
    assert_eq!(out.previous, BlockType::Wisp);
    assert_eq!((light_at(&engine, near), light_at(&engine, far)), (0, 0));
    let stats = pump(&mut engine, inside);
    assert!(stats.is_settled(), "{stats}");
    assert_eq!((light_at(&engine, near), light_at(&engine, far)), (0, 0));
}

#[test]
fn rejected_place_leaves_chunk_and_mesh_alone() {
    let mut engine = Engine::headless(flat_config()).unwrap();
    pump(&mut engine, EYE);
    let c0 = ChunkCoord::new(0, 0, 0);
    let version = engine.store().get(c0).unwrap().version();
    let faces = opaque_faces(&engine, c0);
    let uploads = engine.backend().uploads();

    // Looking out from inside the ground selects the occupied cell itself.
    engine.update(Vec3::new(8.5, 2.5, 8.5), DOWN);
    assert_eq!(engine.selection().unwrap().normal, IVec3::ZERO);
    assert!(matches!(
        engine.place_selected(BlockType::Stone),
        Err(EngineError::Edit(EditError::Occupied(_)))
    ));

    engine.update(EYE, DOWN);
    engine.set_observer_bounds(Some(Aabb::new(
        Vec3::new(8.2, 4.0, 8.2),
        Vec3::new(8.8, 5.8, 8.8),
    )));
    assert!(matches!(
        engine.place_selected(BlockType::Stone),
        Err(EngineError::Edit(EditError::IntersectsObserver(_)))
    ));
    assert!(matches!(
        engine.place_selected(BlockType::Air),
        Err(EngineError::Edit(EditError::PlaceAir))
    ));

    assert_eq!(engine.store().get(c0).unwrap().version(), version);
    assert_eq!(opaque_faces(&engine, c0), faces);
    assert_eq!(engine.backend().uploads(), uploads);
    assert!(engine.modified().is_empty());
}

#[test]
fn failing_restore_is_retried_then_quarantined() {
    let mut engine = Engine::headless(flat_config()).unwrap();
    let bad = ChunkCoord::new(1, 0, 0);
    let mut record = SaveRecord::new(engine.config().seed, EYE);
    record.modified.push(SavedChunk {
        coord: bad,
        blocks: Vec::new(),
    });
    let eye = engine.restore(record);
    let stats = pump(&mut engine, eye);
    assert!(stats.is_settled(), "{stats}");
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.quarantined, 1);
    assert!(engine.is_quarantined(bad));
    assert!(!engine.store().contains(bad));
    assert_eq!((stats.loaded, stats.ready), (26, 26));

    let stats = pump(&mut engine, eye + Vec3::new(-48.0, 0.0, 0.0));
    assert_eq!(stats.quarantined, 0);
    assert!(!engine.is_quarantined(bad));
}

#[test]
fn edits_survive_unload_and_restore() {
    let mut engine = Engine::headless(flat_config()).unwrap();
    pump(&mut engine, EYE);
    let c0 = ChunkCoord::new(0, 0, 0);
    let out = engine.break_selected().unwrap();
    assert_eq!(out.pos, IVec3::new(8, 3, 8));
    assert_eq!(out.previous, BlockType::Grass);

    pump(&mut engine, EYE + Vec3::new(48.0, 0.0, 0.0));
    assert!(!engine.store().contains(c0));
    let record = engine.save_record();
    assert_eq!(record.modified.len(), 1);
    assert_eq!(record.modified[0].coord, c0);

    // Coming back restores the edit instead of regenerating.
    pump(&mut engine, EYE);
    assert!(engine.store().block_at_world(out.pos).unwrap().is_air());

    let mut fresh = Engine::headless(flat_config()).unwrap();
    let eye = fresh.restore(record);
    let stats = pump(&mut fresh, eye);
    assert!(stats.is_settled(), "{stats}");
    assert!(fresh.store().block_at_world(out.pos).unwrap().is_air());
    assert!(fresh.modified().contains(c0));
    assert_eq!(
        fresh.store().get(c0).unwrap().state(),
        ChunkGenState::DecorationsAndRemeshDone
    );
}

#[test]
fn draws_opaque_first_then_transparent_far_to_near() {
    let mut engine = Engine::headless(flat_config()).unwrap();
    pump(&mut engine, EYE);
    engine.place_selected(BlockType::Water).unwrap();
    let east = EYE + Vec3::new(16.0, 0.0, 0.0);
    pump(&mut engine, east);
    engine.place_selected(BlockType::Water).unwrap();
    pump(&mut engine, EYE);

    engine.backend_mut().take_draws();
    engine.draw();
    let draws = engine.backend_mut().take_draws();
    let first_transparent = draws
        .iter()
        .position(|(_, p)| *p == MeshPass::Transparent)
        .unwrap();
    assert!(draws[..first_transparent].iter().all(|(_, p)| *p == MeshPass::Opaque));
    let transparent: Vec<ChunkCoord> = draws[first_transparent..]
        .iter()
        .map(|(c, p)| {
            assert_eq!(*p, MeshPass::Transparent);
            *c
        })
        .collect();
    assert_eq!(
        transparent,
        vec![ChunkCoord::new(1, 0, 0), ChunkCoord::new(0, 0, 0)]
    );
}
