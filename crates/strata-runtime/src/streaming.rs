use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use strata_chunk::{ChunkCoord, ChunkGenState};
use strata_io::SavedChunk;
use strata_structures::decorate_chunk;

use crate::backend::RenderBackend;
use crate::engine::Engine;
use crate::tasks::{GenerateJob, GenerateOut, Job, MeshJob, MeshOut, TaskFailure, TaskKind};

/// Scheduler bookkeeping. In-flight maps hold the job id of the one task
/// per chunk whose result will be accepted.
#[derive(Debug, Default)]
pub(crate) struct StreamState {
    pub(crate) center: Option<ChunkCoord>,
    pub(crate) generating: HashMap<ChunkCoord, u64>,
    pub(crate) staging: HashMap<ChunkCoord, u64>,
    pub(crate) remeshing: HashMap<ChunkCoord, u64>,
    pub(crate) stage_queue: VecDeque<ChunkCoord>,
    /// Chunks published from saved data; they already carry decorations.
    pub(crate) restored: HashSet<ChunkCoord>,
    pub(crate) attempts: HashMap<(ChunkCoord, TaskKind), u32>,
    pub(crate) quarantined: HashSet<ChunkCoord>,
    pub(crate) failed: usize,
}

impl StreamState {
    fn in_flight(&mut self, kind: TaskKind) -> &mut HashMap<ChunkCoord, u64> {
        match kind {
            TaskKind::Generate => &mut self.generating,
            TaskKind::Stage => &mut self.staging,
            TaskKind::Remesh => &mut self.remeshing,
        }
    }

    /// Forgets the in-flight entry if it belongs to `job_id`.
    fn settle(&mut self, kind: TaskKind, coord: ChunkCoord, job_id: u64) -> bool {
        let map = self.in_flight(kind);
        if map.get(&coord) == Some(&job_id) {
            map.remove(&coord);
            true
        } else {
            false
        }
    }
}

/// Snapshot of the streaming pipeline for logs and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub loaded: usize,
    /// Chunks at `DecorationsAndRemeshDone`.
    pub ready: usize,
    pub generating: usize,
    pub staging_queue: usize,
    pub staging: usize,
    pub remeshing: usize,
    /// In-range coords neither loaded nor quarantined.
    pub missing: usize,
    /// Ready chunks whose meshes lag their contents.
    pub dirty: usize,
    /// Task failures seen so far, retries included.
    pub failed: usize,
    pub quarantined: usize,
}

impl StreamStats {
    /// Nothing left to do until the observer moves or the world is edited.
    pub fn is_settled(&self) -> bool {
        self.generating == 0
            && self.staging_queue == 0
            && self.staging == 0
            && self.remeshing == 0
            && self.missing == 0
            && self.dirty == 0
    }
}

impl fmt::Display for StreamStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded={} ready={} gen={} queue={} stage={} remesh={} missing={} dirty={} failed={} quarantined={}",
            self.loaded,
            self.ready,
            self.generating,
            self.staging_queue,
            self.staging,
            self.remeshing,
            self.missing,
            self.dirty,
            self.failed,
            self.quarantined
        )
    }
}

impl<B: RenderBackend> Engine<B> {
    pub fn stats(&self) -> StreamStats {
        let missing = self.stream.center.map_or(0, |center| {
            center
                .cube_around(self.cfg.radius())
                .into_iter()
                .filter(|c| !self.store.contains(*c) && !self.stream.quarantined.contains(c))
                .count()
        });
        StreamStats {
            loaded: self.store.len(),
            ready: self
                .store
                .iter()
                .filter(|(_, c)| c.state() == ChunkGenState::DecorationsAndRemeshDone)
                .count(),
            generating: self.stream.generating.len(),
            staging_queue: self.stream.stage_queue.len(),
            staging: self.stream.staging.len(),
            remeshing: self.stream.remeshing.len(),
            missing,
            dirty: self.dirty_chunks().len(),
            failed: self.stream.failed,
            quarantined: self.stream.quarantined.len(),
        }
    }

    #[inline]
    pub fn is_quarantined(&self, coord: ChunkCoord) -> bool {
        self.stream.quarantined.contains(&coord)
    }

    fn take_job_id(&mut self) -> u64 {
        self.next_job_id += 1;
        self.next_job_id
    }

    pub(crate) fn apply_results(&mut self) {
        for outcome in self.pool.drain_generate() {
            match outcome {
                Ok(out) => self.apply_generated(out),
                Err(failure) => self.on_failure(failure),
            }
        }
        for outcome in self.pool.drain_stage() {
            match outcome {
                Ok(out) => self.apply_staged(out),
                Err(failure) => self.on_failure(failure),
            }
        }
        for outcome in self.pool.drain_remesh() {
            match outcome {
                Ok(out) => self.apply_remeshed(out),
                Err(failure) => self.on_failure(failure),
            }
        }
    }

    fn apply_generated(&mut self, out: GenerateOut) {
        let coord = out.coord;
        if !self.stream.settle(TaskKind::Generate, coord, out.job_id) {
            log::trace!(target: "stream", "dropping superseded generate result for {:?}", coord);
            return;
        }
        self.stream.attempts.remove(&(coord, TaskKind::Generate));
        if self.store.contains(coord) {
            log::warn!(target: "stream", "chunk {:?} generated twice; keeping the live copy", coord);
            return;
        }
        let version = out.chunk.version();
        self.store.insert(out.chunk);
        if out.restored {
            self.saved.remove(&coord);
            self.modified.mark(coord);
            self.stream.restored.insert(coord);
        }
        self.merge_spill(&out.spill);
        // Ready neighbors drew their shared faces and sky light without us.
        for n in coord.face_neighbors() {
            let ready = self
                .store
                .get(n)
                .is_some_and(|c| c.state() == ChunkGenState::DecorationsAndRemeshDone);
            if ready {
                self.invalidate(n);
            }
        }
        self.upload_meshes(coord, &out.meshes, version);
        log::trace!(
            target: "stream",
            "published {:?} ({} bytes of mesh, restored={})",
            coord,
            out.meshes.byte_size(),
            out.restored
        );
    }

    fn apply_staged(&mut self, out: MeshOut) {
        let coord = out.coord;
        if !self.stream.settle(TaskKind::Stage, coord, out.job_id) {
            return;
        }
        self.stream.attempts.remove(&(coord, TaskKind::Stage));
        let Some(live_version) = self.store.get(coord).map(|c| c.version()) else {
            return;
        };
        if live_version != out.version {
            // Contents moved on while the task ran; the remesh pass catches up.
            log::debug!(
                target: "stream",
                "stage result for {:?} is stale (v{} != v{})",
                coord,
                out.version,
                live_version
            );
            if let Some(chunk) = self.store.get_mut(coord) {
                chunk.advance_to(ChunkGenState::DecorationsAndRemeshDone);
            }
            return;
        }
        let mut chunk = out.chunk;
        chunk.advance_to(ChunkGenState::DecorationsAndRemeshDone);
        self.store.insert(chunk);
        self.merge_spill(&out.spill);
        self.upload_meshes(coord, &out.meshes, out.version);
    }

    fn apply_remeshed(&mut self, out: MeshOut) {
        let coord = out.coord;
        if !self.stream.settle(TaskKind::Remesh, coord, out.job_id) {
            return;
        }
        self.stream.attempts.remove(&(coord, TaskKind::Remesh));
        let Some(live) = self.store.get(coord) else {
            return;
        };
        if live.version() != out.version {
            log::trace!(target: "stream", "dropping stale remesh of {:?}", coord);
            return;
        }
        let state = live.state();
        let mut chunk = out.chunk;
        chunk.advance_to(state);
        self.store.insert(chunk);
        self.merge_spill(&out.spill);
        self.upload_meshes(coord, &out.meshes, out.version);
    }

    fn on_failure(&mut self, failure: TaskFailure) {
        let TaskFailure {
            coord, kind, job_id, ..
        } = failure;
        if !self.stream.settle(kind, coord, job_id) {
            return;
        }
        self.stream.failed += 1;
        let attempts = {
            let n = self.stream.attempts.entry((coord, kind)).or_insert(0);
            *n += 1;
            *n
        };
        if attempts <= self.cfg.max_task_retries {
            log::warn!(
                target: "stream",
                "{}; retry {}/{}",
                failure,
                attempts,
                self.cfg.max_task_retries
            );
            match kind {
                TaskKind::Generate => {
                    let in_range = self
                        .stream
                        .center
                        .is_some_and(|c| c.chebyshev(coord) <= self.cfg.radius());
                    if in_range {
                        self.dispatch_generate(coord);
                    }
                }
                TaskKind::Stage => self.dispatch_stage(coord),
                TaskKind::Remesh => {
                    self.request_remesh(coord);
                }
            }
        } else {
            log::error!(
                target: "stream",
                "{}; quarantining {:?} after {} attempt(s)",
                failure,
                coord,
                attempts
            );
            self.stream.attempts.remove(&(coord, kind));
            self.stream.quarantined.insert(coord);
        }
    }

    pub(crate) fn stream_step(&mut self) {
        let center = ChunkCoord::containing(self.observer);
        let radius = self.cfg.radius();
        if self.stream.center != Some(center) {
            let previous = self.stream.center.replace(center);
            // Leaving the radius lifts a quarantine.
            self.stream
                .quarantined
                .retain(|c| c.chebyshev(center) <= radius);
            self.stream
                .attempts
                .retain(|(c, _), _| c.chebyshev(center) <= radius);
            let mut dispatched = 0;
            for c in center.cube_around(radius) {
                if self.store.contains(c)
                    || self.stream.generating.contains_key(&c)
                    || self.stream.quarantined.contains(&c)
                {
                    continue;
                }
                self.dispatch_generate(c);
                dispatched += 1;
            }
            log::debug!(
                target: "stream",
                "center {:?} -> {:?}: dispatched {} generate task(s)",
                previous,
                center,
                dispatched
            );
        }
        self.unload_out_of_range(center, radius);
        self.promote_generated(center, radius);
        self.dispatch_staging(center, radius);
        for c in self.dirty_chunks() {
            self.request_remesh(c);
        }
    }

    fn unload_out_of_range(&mut self, center: ChunkCoord, radius: i32) {
        let far: Vec<ChunkCoord> = self
            .store
            .coords()
            .filter(|c| c.chebyshev(center) > radius)
            .collect();
        for &c in &far {
            if self.modified.remove(c) {
                if let Some(chunk) = self.store.get(c) {
                    self.saved.insert(c, SavedChunk::from_chunk(chunk));
                }
            }
            self.store.remove(c);
            self.release_chunk(c);
            self.stream.restored.remove(&c);
            self.stream.staging.remove(&c);
            self.stream.remeshing.remove(&c);
        }
        if !far.is_empty() {
            log::debug!(target: "stream", "unloaded {} chunk(s)", far.len());
        }
    }

    fn promote_generated(&mut self, center: ChunkCoord, radius: i32) {
        let mut fresh: Vec<ChunkCoord> = self
            .store
            .iter()
            .filter(|(c, chunk)| {
                chunk.state() == ChunkGenState::TerrainGenerated && c.chebyshev(center) <= radius
            })
            .map(|(c, _)| c)
            .collect();
        fresh.sort_by_key(|c| (c.chebyshev(center), c.distance_sq(center), *c));
        for c in fresh {
            if let Some(chunk) = self.store.get_mut(c) {
                chunk.advance_to(ChunkGenState::StagingQueued);
            }
            self.stream.stage_queue.push_back(c);
        }
    }

    /// In-range face neighbors are present (or given up on), so decorations
    /// and light can cross into them.
    fn neighbors_present(&self, coord: ChunkCoord, center: ChunkCoord, radius: i32) -> bool {
        coord.face_neighbors().into_iter().all(|n| {
            n.chebyshev(center) > radius
                || self.store.contains(n)
                || self.stream.quarantined.contains(&n)
        })
    }

    fn dispatch_staging(&mut self, center: ChunkCoord, radius: i32) {
        let mut dispatched = 0;
        let mut deferred = Vec::new();
        let pending = self.stream.stage_queue.len();
        for _ in 0..pending {
            if dispatched >= self.cfg.stage_per_frame {
                break;
            }
            let Some(c) = self.stream.stage_queue.pop_front() else {
                break;
            };
            let queued = self
                .store
                .get(c)
                .is_some_and(|chunk| chunk.state() == ChunkGenState::StagingQueued);
            if !queued || self.stream.staging.contains_key(&c) {
                continue;
            }
            if !self.neighbors_present(c, center, radius) {
                deferred.push(c);
                continue;
            }
            if !self.stream.restored.remove(&c) {
                let seed = self.ctx.seed;
                let report = decorate_chunk(&mut self.store, c, seed, &self.cfg.decoration);
                self.relight_decorated_neighbors(c, &report.touched);
            }
            self.dispatch_stage(c);
            dispatched += 1;
        }
        for c in deferred.into_iter().rev() {
            self.stream.stage_queue.push_front(c);
        }
    }

    /// Structures that reached into already lit chunks may have covered
    /// light they were passing on.
    fn relight_decorated_neighbors(&mut self, origin: ChunkCoord, touched: &[ChunkCoord]) {
        for &t in touched {
            let done = t != origin
                && self
                    .store
                    .get(t)
                    .is_some_and(|c| c.state() == ChunkGenState::DecorationsAndRemeshDone);
            if !done {
                continue;
            }
            for n in self.relight_after_change(t) {
                if n != origin {
                    self.invalidate(n);
                }
            }
            self.request_remesh(t);
        }
    }

    pub(crate) fn dispatch_generate(&mut self, coord: ChunkCoord) {
        let job_id = self.take_job_id();
        let job = GenerateJob {
            ctx: Arc::clone(&self.ctx),
            job_id,
            coord,
            region: self.store.neighborhood_snapshot(coord),
            saved: self.saved.get(&coord).cloned(),
            camera: self.observer,
        };
        if self.pool.submit(Job::Generate(job)) {
            self.stream.generating.insert(coord, job_id);
        } else {
            log::error!(target: "stream", "worker pool is gone; cannot generate {:?}", coord);
        }
    }

    fn mesh_job(&mut self, coord: ChunkCoord) -> Option<MeshJob> {
        let version = self.store.get(coord)?.version();
        Some(MeshJob {
            ctx: Arc::clone(&self.ctx),
            job_id: self.take_job_id(),
            coord,
            region: self.store.neighborhood_snapshot(coord),
            version,
            camera: self.observer,
        })
    }

    fn dispatch_stage(&mut self, coord: ChunkCoord) {
        let Some(job) = self.mesh_job(coord) else {
            return;
        };
        let job_id = job.job_id;
        if self.pool.submit(Job::Stage(job)) {
            self.stream.staging.insert(coord, job_id);
        }
    }

    /// Ready chunks whose uploaded meshes predate their contents.
    fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self
            .store
            .iter()
            .filter(|(c, chunk)| {
                chunk.state() == ChunkGenState::DecorationsAndRemeshDone
                    && !self.stream.quarantined.contains(c)
                    && self
                        .renders
                        .get(c)
                        .is_none_or(|r| r.mesh_version != chunk.version())
            })
            .map(|(c, _)| c)
            .collect();
        v.sort();
        v
    }

    /// Queues a Remesh for a ready chunk. A no-op when the meshes are
    /// current or a remesh of the chunk is already running; a running one
    /// that turns out stale is re-requested by the next frame.
    pub fn request_remesh(&mut self, coord: ChunkCoord) -> bool {
        let Some(chunk) = self.store.get(coord) else {
            return false;
        };
        if chunk.state() != ChunkGenState::DecorationsAndRemeshDone
            || self.stream.quarantined.contains(&coord)
            || self.stream.staging.contains_key(&coord)
            || self.stream.remeshing.contains_key(&coord)
        {
            return false;
        }
        let version = chunk.version();
        if self
            .renders
            .get(&coord)
            .is_some_and(|r| r.mesh_version == version)
        {
            return false;
        }
        let Some(job) = self.mesh_job(coord) else {
            return false;
        };
        let job_id = job.job_id;
        if self.pool.submit(Job::Remesh(job)) {
            self.stream.remeshing.insert(coord, job_id);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_only_accepts_the_tracked_job() {
        let mut s = StreamState::default();
        let c = ChunkCoord::new(0, 0, 0);
        s.generating.insert(c, 4);
        assert!(!s.settle(TaskKind::Generate, c, 3));
        assert!(!s.settle(TaskKind::Stage, c, 4));
        assert!(s.settle(TaskKind::Generate, c, 4));
        assert!(s.generating.is_empty());
    }

    #[test]
    fn settled_requires_an_idle_pipeline() {
        assert!(StreamStats::default().is_settled());
        let busy = StreamStats {
            remeshing: 1,
            ..StreamStats::default()
        };
        assert!(!busy.is_settled());
        let failed = StreamStats {
            failed: 3,
            quarantined: 1,
            ..StreamStats::default()
        };
        assert!(failed.is_settled());
    }
}
