//! Core types and utilities

pub mod frame;
pub mod params;
pub mod rng;

pub use frame::{Frame, FramePoint, History};
pub use params::SimulationParameters;
pub use rng::SimRng;
