use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use strata_blocks::{BlockCatalog, BlockType, TextureAtlas};
use strata_chunk::{CHUNK_SIZE_I32, ChunkCoord, ChunkStore};
use strata_edit::{EditError, EditOutcome, ModifiedChunks, RayHit, break_block, place_block, raycast};
use strata_geom::{Aabb, Vec3};
use strata_io::{SaveRecord, SavedChunk};
use strata_lighting::{LightSpill, relight_around};
use strata_mesh_cpu::{ChunkMeshes, MeshPass, build_chunk_meshes};

use crate::backend::{HeadlessBackend, RenderBackend};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::pool::WorkerPool;
use crate::streaming::StreamState;
use crate::tasks::TaskContext;

/// Uploaded meshes of one chunk.
pub(crate) struct ChunkRender<H> {
    pub(crate) opaque: Option<H>,
    pub(crate) transparent: Option<H>,
    /// Chunk version the uploaded meshes were built from.
    pub(crate) mesh_version: u64,
}

impl<H> ChunkRender<H> {
    fn slot(&mut self, pass: MeshPass) -> &mut Option<H> {
        match pass {
            MeshPass::Opaque => &mut self.opaque,
            MeshPass::Transparent => &mut self.transparent,
        }
    }
}

fn chunk_center(coord: ChunkCoord) -> Vec3 {
    let half = CHUNK_SIZE_I32 as f32 * 0.5;
    coord.origin().as_vec3() + Vec3::new(half, half, half)
}

/// The terrain engine as seen by a host application: stream around an
/// observer, draw, and edit the block under the crosshair.
///
/// All methods run on the thread that owns the renderer.
pub struct Engine<B: RenderBackend = HeadlessBackend> {
    pub(crate) cfg: EngineConfig,
    pub(crate) ctx: Arc<TaskContext>,
    pub(crate) store: ChunkStore,
    pub(crate) pool: WorkerPool,
    pub(crate) backend: B,
    pub(crate) renders: HashMap<ChunkCoord, ChunkRender<B::Handle>>,
    pub(crate) stream: StreamState,
    pub(crate) modified: ModifiedChunks,
    /// Edited chunks that were unloaded (or read from a save); restored
    /// instead of regenerated.
    pub(crate) saved: HashMap<ChunkCoord, SavedChunk>,
    pub(crate) observer: Vec3,
    pub(crate) next_job_id: u64,
    view_dir: Vec3,
    observer_bounds: Option<Aabb>,
    selection: Option<RayHit>,
}

impl Engine<HeadlessBackend> {
    /// Builtin blocks and atlas, no renderer.
    pub fn headless(cfg: EngineConfig) -> Result<Self, EngineError> {
        Self::new(
            cfg,
            BlockCatalog::builtin(),
            TextureAtlas::builtin(),
            HeadlessBackend::new(),
        )
    }
}

impl<B: RenderBackend> Engine<B> {
    pub fn new(
        cfg: EngineConfig,
        catalog: BlockCatalog,
        atlas: TextureAtlas,
        backend: B,
    ) -> Result<Self, EngineError> {
        cfg.validate()?;
        let ctx = Arc::new(TaskContext {
            seed: cfg.seed,
            worldgen: cfg.worldgen.clone(),
            catalog: Arc::new(catalog),
            atlas: Arc::new(atlas),
        });
        let pool = WorkerPool::new(cfg.worker_count)?;
        log::info!(
            target: "stream",
            "engine up: seed={} render_distance={} radius={}",
            cfg.seed,
            cfg.render_distance,
            cfg.radius()
        );
        Ok(Self {
            cfg,
            ctx,
            store: ChunkStore::new(),
            pool,
            backend,
            renders: HashMap::new(),
            stream: StreamState::default(),
            modified: ModifiedChunks::new(),
            saved: HashMap::new(),
            observer: Vec3::ZERO,
            next_job_id: 0,
            view_dir: Vec3::new(0.0, 0.0, -1.0),
            observer_bounds: None,
            selection: None,
        })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    #[inline]
    pub fn catalog(&self) -> &BlockCatalog {
        &self.ctx.catalog
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn modified(&self) -> &ModifiedChunks {
        &self.modified
    }

    #[inline]
    pub fn observer(&self) -> Vec3 {
        self.observer
    }

    /// Block under the view ray as of the last update or edit.
    #[inline]
    pub fn selection(&self) -> Option<RayHit> {
        self.selection
    }

    /// Body used to reject placements that would trap the observer.
    pub fn set_observer_bounds(&mut self, bounds: Option<Aabb>) {
        self.observer_bounds = bounds;
    }

    /// One frame: take finished work, stream around `observer`, and refresh
    /// the selection along `view_dir`.
    pub fn update(&mut self, observer: Vec3, view_dir: Vec3) {
        self.observer = observer;
        self.view_dir = view_dir;
        self.apply_results();
        self.stream_step();
        self.selection = self.pick();
    }

    fn pick(&self) -> Option<RayHit> {
        let store = &self.store;
        let catalog = &self.ctx.catalog;
        // Fluids and other unbreakable cells do not stop the ray.
        raycast(self.observer, self.view_dir, self.cfg.reach, |p| {
            store
                .block_at_world(p)
                .is_some_and(|b| catalog.is_breakable(b.kind))
        })
    }

    /// Opaque meshes near to far, then transparent meshes far to near.
    pub fn draw(&mut self) {
        let Self {
            renders,
            backend,
            observer,
            ..
        } = self;
        let dist = |c: ChunkCoord| (chunk_center(c) - *observer).length_sq();
        let mut opaque: Vec<(f32, &B::Handle)> = renders
            .iter()
            .filter_map(|(c, r)| r.opaque.as_ref().map(|h| (dist(*c), h)))
            .collect();
        opaque.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, h) in opaque {
            backend.draw(h);
        }
        let mut transparent: Vec<(f32, &B::Handle)> = renders
            .iter()
            .filter_map(|(c, r)| r.transparent.as_ref().map(|h| (dist(*c), h)))
            .collect();
        transparent.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (_, h) in transparent {
            backend.draw(h);
        }
    }

    pub fn break_selected(&mut self) -> Result<EditOutcome, EngineError> {
        let hit = self.selection.ok_or(EditError::NoSelection)?;
        let catalog = Arc::clone(&self.ctx.catalog);
        let outcome = break_block(&mut self.store, &catalog, hit.block)?;
        self.finish_edit(&outcome);
        Ok(outcome)
    }

    pub fn place_selected(&mut self, kind: BlockType) -> Result<EditOutcome, EngineError> {
        let hit = self.selection.ok_or(EditError::NoSelection)?;
        let outcome = place_block(&mut self.store, &hit, kind, self.observer_bounds)?;
        self.finish_edit(&outcome);
        Ok(outcome)
    }

    /// Relights and remeshes the edited chunk right away; neighbors are
    /// invalidated and picked up by the remesh pass.
    fn finish_edit(&mut self, outcome: &EditOutcome) {
        let coord = outcome.coord;
        let mut stale: HashSet<ChunkCoord> = self.relight_after_change(coord).into_iter().collect();
        stale.extend(outcome.neighbors.iter().copied());
        self.rebuild_now(coord);
        for n in stale {
            self.invalidate(n);
        }
        if self.modified.mark(coord) {
            log::debug!(target: "edit", "chunk {:?} marked modified", coord);
        }
        self.selection = self.pick();
    }

    /// Relights `coord` and the chunks around it on the live store after
    /// its blocks changed. Returns the other chunks whose light moved.
    pub(crate) fn relight_after_change(&mut self, coord: ChunkCoord) -> Vec<ChunkCoord> {
        let catalog = Arc::clone(&self.ctx.catalog);
        let report = relight_around(&mut self.store, &catalog, coord);
        report.changed.into_iter().filter(|c| *c != coord).collect()
    }

    fn rebuild_now(&mut self, coord: ChunkCoord) {
        let Some(version) = self.store.get(coord).map(|c| c.version()) else {
            return;
        };
        let meshes = build_chunk_meshes(
            &self.store,
            coord,
            &self.ctx.catalog,
            &self.ctx.atlas,
            Some(self.observer),
        );
        self.upload_meshes(coord, &meshes, version);
    }

    /// Bumps the chunk version so its meshes are rebuilt, then asks for a
    /// remesh.
    pub fn invalidate(&mut self, coord: ChunkCoord) {
        if let Some(chunk) = self.store.get_mut(coord) {
            chunk.touch();
            self.request_remesh(coord);
        }
    }

    /// Replaces both passes of `coord`. Empty meshes are released, not
    /// uploaded.
    pub(crate) fn upload_meshes(&mut self, coord: ChunkCoord, meshes: &ChunkMeshes, version: u64) {
        let Self {
            renders, backend, ..
        } = self;
        let render = renders.entry(coord).or_insert_with(|| ChunkRender {
            opaque: None,
            transparent: None,
            mesh_version: version,
        });
        for pass in MeshPass::ALL {
            let slot = render.slot(pass);
            if let Some(old) = slot.take() {
                backend.release(old);
            }
            let mesh = meshes.pass(pass);
            if !mesh.is_empty() {
                *slot = Some(backend.upload(coord, pass, mesh));
            }
        }
        render.mesh_version = version;
    }

    pub(crate) fn release_chunk(&mut self, coord: ChunkCoord) {
        if let Some(render) = self.renders.remove(&coord) {
            for h in [render.opaque, render.transparent].into_iter().flatten() {
                self.backend.release(h);
            }
        }
    }

    /// Max-merges light raised in other chunks and marks them for remeshing.
    pub(crate) fn merge_spill(&mut self, spill: &LightSpill) {
        for c in spill.merge_into(&mut self.store) {
            if let Some(chunk) = self.store.get_mut(c) {
                chunk.touch();
            }
        }
    }

    /// Seed, observer, and every edited chunk, loaded or not.
    pub fn save_record(&self) -> SaveRecord {
        let mut record = SaveRecord::new(self.cfg.seed, self.observer);
        for (coord, saved) in &self.saved {
            if !self.modified.contains(*coord) {
                record.modified.push(saved.clone());
            }
        }
        for coord in self.modified.sorted() {
            if let Some(chunk) = self.store.get(coord) {
                record.put_chunk(chunk);
            }
        }
        record.modified.sort_by_key(|c| c.coord);
        record
    }

    /// Drops the current world and continues from `record`. Returns the
    /// saved observer position; the next update streams around it.
    pub fn restore(&mut self, record: SaveRecord) -> Vec3 {
        let loaded: Vec<ChunkCoord> = self.renders.keys().copied().collect();
        for c in loaded {
            self.release_chunk(c);
        }
        self.store = ChunkStore::new();
        self.stream = StreamState::default();
        self.modified.clear();
        self.selection = None;
        self.cfg.seed = record.seed;
        self.ctx = Arc::new(TaskContext {
            seed: record.seed,
            worldgen: self.ctx.worldgen.clone(),
            catalog: Arc::clone(&self.ctx.catalog),
            atlas: Arc::clone(&self.ctx.atlas),
        });
        self.observer = record.observer_pos();
        self.saved = record.modified.into_iter().map(|c| (c.coord, c)).collect();
        log::info!(
            target: "io",
            "restored world seed={} with {} saved chunk(s)",
            self.cfg.seed,
            self.saved.len()
        );
        self.observer
    }
}
