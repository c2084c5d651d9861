use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use strata_blocks::{BlockCatalog, TextureAtlas};
use strata_chunk::{Chunk, ChunkCoord, ChunkStore};
use strata_geom::Vec3;
use strata_io::SavedChunk;
use strata_lighting::{LightSpill, relight_chunk};
use strata_mesh_cpu::{ChunkMeshes, build_chunk_meshes};
use strata_world::{WorldGenParams, generate_chunk};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Generate,
    Stage,
    Remesh,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Generate, TaskKind::Stage, TaskKind::Remesh];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind:?} task #{job_id} for {coord:?} failed: {reason}")]
pub struct TaskFailure {
    pub coord: ChunkCoord,
    pub kind: TaskKind,
    pub job_id: u64,
    pub reason: String,
}

pub type TaskOutcome<T> = Result<T, TaskFailure>;

/// Read-only inputs shared by every task of one world.
#[derive(Debug)]
pub struct TaskContext {
    pub seed: u64,
    pub worldgen: WorldGenParams,
    pub catalog: Arc<BlockCatalog>,
    pub atlas: Arc<TextureAtlas>,
}

pub struct GenerateJob {
    pub ctx: Arc<TaskContext>,
    pub job_id: u64,
    pub coord: ChunkCoord,
    /// Published chunks around `coord`; the new chunk is added by the worker.
    pub region: ChunkStore,
    pub saved: Option<SavedChunk>,
    pub camera: Vec3,
}

/// Input of a Stage or Remesh task: relight and mesh an existing chunk.
pub struct MeshJob {
    pub ctx: Arc<TaskContext>,
    pub job_id: u64,
    pub coord: ChunkCoord,
    pub region: ChunkStore,
    pub version: u64,
    pub camera: Vec3,
}

pub enum Job {
    Generate(GenerateJob),
    Stage(MeshJob),
    Remesh(MeshJob),
}

impl Job {
    pub fn kind(&self) -> TaskKind {
        match self {
            Job::Generate(_) => TaskKind::Generate,
            Job::Stage(_) => TaskKind::Stage,
            Job::Remesh(_) => TaskKind::Remesh,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        match self {
            Job::Generate(j) => j.coord,
            Job::Stage(j) | Job::Remesh(j) => j.coord,
        }
    }

    pub fn job_id(&self) -> u64 {
        match self {
            Job::Generate(j) => j.job_id,
            Job::Stage(j) | Job::Remesh(j) => j.job_id,
        }
    }
}

pub struct GenerateOut {
    pub job_id: u64,
    pub coord: ChunkCoord,
    pub chunk: Chunk,
    pub restored: bool,
    pub spill: LightSpill,
    pub meshes: ChunkMeshes,
}

pub struct MeshOut {
    pub job_id: u64,
    pub coord: ChunkCoord,
    /// Chunk version the job was dispatched against.
    pub version: u64,
    pub chunk: Chunk,
    pub spill: LightSpill,
    pub meshes: ChunkMeshes,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

/// Runs `f`, turning both its error and a panic into a [`TaskFailure`].
pub(crate) fn guarded<T>(
    kind: TaskKind,
    coord: ChunkCoord,
    job_id: u64,
    f: impl FnOnce() -> Result<T, String>,
) -> TaskOutcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(reason)) => Err(TaskFailure {
            coord,
            kind,
            job_id,
            reason,
        }),
        Err(payload) => Err(TaskFailure {
            coord,
            kind,
            job_id,
            reason: format!("panic: {}", panic_message(payload.as_ref())),
        }),
    }
}

pub(crate) fn run_generate(job: GenerateJob) -> Result<GenerateOut, String> {
    let ctx = job.ctx.as_ref();
    let t0 = Instant::now();
    let coord = job.coord;
    let restored = job.saved.is_some();
    let chunk = match &job.saved {
        Some(saved) => saved.to_chunk().map_err(|e| e.to_string())?,
        None => generate_chunk(ctx.seed, &ctx.worldgen, coord),
    };
    let t_gen = t0.elapsed();
    let mut region = job.region;
    region.insert(chunk);
    let t1 = Instant::now();
    let report = relight_chunk(&mut region, &ctx.catalog, coord);
    let t_light = t1.elapsed();
    let t2 = Instant::now();
    let meshes = build_chunk_meshes(&region, coord, &ctx.catalog, &ctx.atlas, Some(job.camera));
    let t_mesh = t2.elapsed();
    let chunk = region
        .take(coord)
        .ok_or_else(|| format!("chunk {coord:?} missing from its region"))?;
    log::debug!(
        target: "perf",
        "generate {:?}: gen={:?} light={:?} mesh={:?} restored={}",
        coord,
        t_gen,
        t_light,
        t_mesh,
        restored
    );
    Ok(GenerateOut {
        job_id: job.job_id,
        coord,
        chunk,
        restored,
        spill: report.spill,
        meshes,
    })
}

pub(crate) fn run_mesh(kind: TaskKind, job: MeshJob) -> Result<MeshOut, String> {
    let ctx = job.ctx.as_ref();
    let coord = job.coord;
    let mut region = job.region;
    if !region.contains(coord) {
        return Err(format!("chunk {coord:?} was not in the snapshot"));
    }
    let t0 = Instant::now();
    let report = relight_chunk(&mut region, &ctx.catalog, coord);
    let t_light = t0.elapsed();
    let t1 = Instant::now();
    let meshes = build_chunk_meshes(&region, coord, &ctx.catalog, &ctx.atlas, Some(job.camera));
    let t_mesh = t1.elapsed();
    let chunk = region
        .take(coord)
        .ok_or_else(|| format!("chunk {coord:?} missing from its region"))?;
    log::debug!(
        target: "perf",
        "{:?} {:?}: light={:?} mesh={:?} faces={}+{}",
        kind,
        coord,
        t_light,
        t_mesh,
        meshes.opaque.face_count(),
        meshes.transparent.face_count()
    );
    Ok(MeshOut {
        job_id: job.job_id,
        coord,
        version: job.version,
        chunk,
        spill: report.spill,
        meshes,
    })
}
