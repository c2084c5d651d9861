use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::tasks::{GenerateOut, Job, MeshOut, TaskKind, TaskOutcome, guarded, run_generate, run_mesh};

#[derive(Default)]
struct Counters {
    queued: [AtomicUsize; 3],
    inflight: [AtomicUsize; 3],
}

/// Queue depth and running tasks per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub queued: [usize; 3],
    pub inflight: [usize; 3],
}

impl QueueCounts {
    pub fn queued(&self, kind: TaskKind) -> usize {
        self.queued[kind.index()]
    }

    pub fn inflight(&self, kind: TaskKind) -> usize {
        self.inflight[kind.index()]
    }
}

struct ResultTx {
    generate: Sender<TaskOutcome<GenerateOut>>,
    stage: Sender<TaskOutcome<MeshOut>>,
    remesh: Sender<TaskOutcome<MeshOut>>,
}

/// Fixed set of worker loops fed from one job queue, with one result channel
/// per task kind. A failing task is reported, never fatal to its worker.
pub struct WorkerPool {
    job_tx: Sender<Job>,
    generate_rx: Receiver<TaskOutcome<GenerateOut>>,
    stage_rx: Receiver<TaskOutcome<MeshOut>>,
    remesh_rx: Receiver<TaskOutcome<MeshOut>>,
    counters: Arc<Counters>,
    workers: usize,
    _pool: ThreadPool,
}

fn process_job(job: Job, tx: &ResultTx) {
    let (kind, coord, id) = (job.kind(), job.coord(), job.job_id());
    // A closed result channel only means the engine is shutting down.
    match job {
        Job::Generate(j) => {
            let _ = tx.generate.send(guarded(kind, coord, id, || run_generate(j)));
        }
        Job::Stage(j) => {
            let _ = tx.stage.send(guarded(kind, coord, id, || run_mesh(kind, j)));
        }
        Job::Remesh(j) => {
            let _ = tx.remesh.send(guarded(kind, coord, id, || run_mesh(kind, j)));
        }
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = workers.max(1);
        let (job_tx, job_rx) = unbounded::<Job>();
        let (gen_tx, generate_rx) = unbounded();
        let (stage_tx, stage_rx) = unbounded();
        let (remesh_tx, remesh_rx) = unbounded();
        let counters = Arc::new(Counters::default());
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("strata-worker-{i}"))
            .build()?;
        for _ in 0..workers {
            let rx = job_rx.clone();
            let counters = Arc::clone(&counters);
            let tx = ResultTx {
                generate: gen_tx.clone(),
                stage: stage_tx.clone(),
                remesh: remesh_tx.clone(),
            };
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    let k = job.kind().index();
                    counters.queued[k].fetch_sub(1, Ordering::Relaxed);
                    counters.inflight[k].fetch_add(1, Ordering::Relaxed);
                    process_job(job, &tx);
                    counters.inflight[k].fetch_sub(1, Ordering::Relaxed);
                }
            });
        }
        log::info!(target: "stream", "worker pool started with {workers} worker(s)");
        Ok(Self {
            job_tx,
            generate_rx,
            stage_rx,
            remesh_rx,
            counters,
            workers,
            _pool: pool,
        })
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues a job. Returns `false` if no worker is left to take it.
    pub fn submit(&self, job: Job) -> bool {
        let k = job.kind().index();
        self.counters.queued[k].fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.counters.queued[k].fetch_sub(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    pub fn drain_generate(&self) -> Vec<TaskOutcome<GenerateOut>> {
        self.generate_rx.try_iter().collect()
    }

    pub fn drain_stage(&self) -> Vec<TaskOutcome<MeshOut>> {
        self.stage_rx.try_iter().collect()
    }

    pub fn drain_remesh(&self) -> Vec<TaskOutcome<MeshOut>> {
        self.remesh_rx.try_iter().collect()
    }

    pub fn queue_counts(&self) -> QueueCounts {
        let mut out = QueueCounts::default();
        for kind in TaskKind::ALL {
            let k = kind.index();
            out.queued[k] = self.counters.queued[k].load(Ordering::Relaxed);
            out.inflight[k] = self.counters.inflight[k].load(Ordering::Relaxed);
        }
        out
    }
}
