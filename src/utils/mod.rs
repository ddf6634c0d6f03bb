//! Utility helpers: node storage, logging and per-tick profiling.

pub mod arena;
pub mod logging;
pub mod profiling;

pub use arena::{Arena, NodeId};
pub use profiling::TickProfile;
