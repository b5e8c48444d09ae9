//! # Checkpoint
//!
//! Windowed deltas and safe ratios over checkpointed simulator counters.
//!
//! Architectural simulators dump every counter cumulatively at a series of
//! checkpoints. This crate turns those dumps into per-entity activity over a
//! window of checkpoints, optionally discarding a warm-up prefix, and combines
//! the resulting vectors into aggregate ratios.
//!
//! The data itself is reached through the [`StatsSource`] trait so that the
//! arithmetic can run against [`InMemoryStats`] without any file on disk.

pub mod error;
pub mod ratio;
pub mod series;
pub mod window;

pub use error::Error;
pub use ratio::*;
pub use series::*;
pub use window::*;
