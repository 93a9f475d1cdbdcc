//! Merge engine namespace: decisions, trigger classification, session buffers.

mod buffer;
mod core;
mod decision;
mod trigger;

pub use buffer::SessionBuffer;
pub(crate) use buffer::Transition;
pub use self::core::MergeEngine;
pub use decision::Decision;
pub use trigger::{TriggerKind, classify};
