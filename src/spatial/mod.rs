//! Spatial context shared by the behavior and collision passes

pub mod registry;
pub mod terrain;

pub use registry::{SpatialRegistry, StartleRecord};
pub use terrain::TerrainField;
