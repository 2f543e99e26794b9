//! World addressing, terrain configuration, and density sources.
#![forbid(unsafe_code)]

mod chunk_coord;
pub mod config;
pub mod density;
pub mod hash;
mod material;
mod voxel;

pub use chunk_coord::ChunkCoord;
pub use config::{MesherKind, NoiseConfig, TerrainConfig, load_config_from_path};
pub use density::{DensitySource, FlatTerrain, NoiseTerrain, SphereTerrain};
pub use hash::PackedCoord;
pub use material::MaterialKey;
pub use voxel::Voxel;

/// Default number of cubes along each chunk axis.
pub const CUBES_PER_AXIS: usize = 16;
