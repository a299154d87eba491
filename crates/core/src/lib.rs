//! Firecast Core Library
//!
//! A stochastic cellular wildfire-spread model on a square grid. A run seeds
//! a burning square at the grid center, then repeatedly consumes fuel,
//! decays intensity and tries probabilistic ignitions into neighboring
//! cells, biased by wind, slope and a static roughness map. After every
//! timestep the burning cells are projected to latitude/longitude and
//! exported as one frame.
//!
//! ## Modules
//!
//! - `core_types`: parameters, frames, the per-run random source
//! - `grid`: terrain maps and compass wind resolution
//! - `solver`: field storage and the spread transition
//! - `simulation`: stepwise runs, whole runs, ensembles, frame export
//! - `advisor`: free-text parameter extraction and impact questions
//!
//! ```no_run
//! use firecast_core::{SimulationConfig, SimulationParameters, SimulationRunner};
//!
//! let params = SimulationParameters::default().with_wind(25.0, "NW");
//! let runner = SimulationRunner::new(SimulationConfig::seeded(7));
//! let history = runner.run(&params)?;
//! assert_eq!(history.len(), 48);
//! # Ok::<(), firecast_core::SimError>(())
//! ```

// Core types and utilities
pub mod core_types;
pub mod error;

// Static inputs and the spread model
pub mod grid;
pub mod solver;

// Orchestration
pub mod simulation;

// Collaborator boundaries
pub mod advisor;

// Re-export core types
pub use core_types::{Frame, FramePoint, History, SimRng, SimulationParameters};
pub use error::{AnalysisError, ExtractionError, SimError, SimResult};

// Re-export model types
pub use grid::{CompassDirection, TerrainConfig, TerrainField, WindModel};
pub use solver::{CombustionField, FieldData, QualityPreset, SpreadConfig, SpreadEngine};

// Re-export orchestration types
pub use simulation::{
    ExportConfig, FrameExporter, RunOutcome, RunSummary, Simulation, SimulationConfig,
    SimulationRunner,
};

// Re-export advisor types
pub use advisor::{
    assess_impacts, Asset, FilterAnalyst, ImpactAnalyst, ImpactAnswer, KeywordExtractor,
    ParameterExtractor, ParameterOverrides, RiskEntity,
};
