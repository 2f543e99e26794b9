//! Chunk voxel storage, mesh buffers, and the resident-chunk registry.
#![forbid(unsafe_code)]

mod batch;
mod chunk;
mod grid;
pub mod material;
mod mesh;
mod registry;

pub use batch::GridBatch;
pub use chunk::Chunk;
pub use grid::{VoxelGrid, VoxelGridView, VoxelGridViewMut};
pub use material::{Material, MaterialError, MaterialRegistry};
pub use mesh::{MeshBuffers, SubMesh, probe_physically_correct};
pub use registry::{ChunkRegistry, RegistryError};

pub use isoterra_world::{ChunkCoord, MaterialKey, Voxel};
