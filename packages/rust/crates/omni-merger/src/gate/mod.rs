//! Session-scoped merge gating for concurrent hosts.

mod core;
mod sweeper;
mod types;

pub use types::{BufferSnapshot, SharedMergeEngine};
