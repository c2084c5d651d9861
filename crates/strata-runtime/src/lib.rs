//! Background work and the engine facade: a bounded worker pool, the
//! streaming scheduler that keeps chunks loaded around the observer, and
//! synchronous block edits.
#![forbid(unsafe_code)]

mod backend;
mod config;
mod engine;
mod error;
mod pool;
mod streaming;
mod tasks;

pub use backend::{HeadlessBackend, HeadlessHandle, RenderBackend};
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::EngineError;
pub use pool::{QueueCounts, WorkerPool};
pub use streaming::StreamStats;
pub use tasks::{
    GenerateJob, GenerateOut, Job, MeshJob, MeshOut, TaskContext, TaskFailure, TaskKind, TaskOutcome,
};
