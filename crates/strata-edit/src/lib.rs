//! Block picking and single-block edits on the chunk store.
#![forbid(unsafe_code)]

mod edit;
mod modified;
mod raycast;

pub use edit::{EditError, EditOutcome, break_block, place_block, place_target};
pub use modified::ModifiedChunks;
pub use raycast::{MAX_RAY_STEPS, RAY_EPSILON, RayHit, raycast};
