//! Simulation orchestration
//!
//! Ties the static inputs (terrain, wind) to the spread engine and exports
//! one geocoded frame per timestep:
//!
//! - [`Simulation`]: one run, stepped explicitly
//! - [`SimulationRunner`]: whole runs, cancellable runs and parallel ensembles
//! - [`FrameExporter`]: field to latitude/longitude projection

mod config;
mod field_simulation;
pub mod frame_export;
mod runner;

pub use config::SimulationConfig;
pub use field_simulation::{RunOutcome, RunSummary, Simulation};
pub use frame_export::{ExportConfig, FrameExporter};
pub use runner::SimulationRunner;
