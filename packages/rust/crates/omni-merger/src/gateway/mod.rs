//! Gateway namespace: stdio and replay dispatchers.

mod replay;
mod stdio;

pub use replay::{ReplayRecord, load_replay_events, replay_events};
pub use stdio::{
    DEFAULT_STDIO_SEPARATOR, StdioOptions, parse_stdio_line, run_stdio, run_stdio_with,
};
