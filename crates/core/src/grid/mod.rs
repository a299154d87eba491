//! Static per-run inputs: terrain roughness, initial fuel and wind

pub mod terrain;
pub mod wind_field;

// Re-export main types
pub use terrain::{TerrainConfig, TerrainField};
pub use wind_field::{CompassDirection, WindModel};
