//! Combustion field storage and the spread transition
//!
//! [`SpreadEngine`] owns a [`CombustionField`] and advances it one timestep
//! at a time. Everything here is single-threaded and deterministic for a
//! given [`SimRng`](crate::core_types::SimRng) sequence.

mod fields;
pub mod profiler;
mod quality;
pub mod spread;

// Re-exports
pub use fields::{CombustionField, FieldData};
pub use profiler::{FrameTimer, ProfilerScope};
pub use quality::QualityPreset;
pub use spread::{SpreadConfig, SpreadEngine, StepStats, NEIGHBOR_OFFSETS};
