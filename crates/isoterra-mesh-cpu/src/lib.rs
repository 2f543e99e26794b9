//! CPU Marching Cubes meshers (cube and tetrahedral) over chunk voxel grids.
#![forbid(unsafe_code)]

mod cube;
mod march;
pub mod tables;
mod tetra;

use isoterra_chunk::{MeshBuffers, VoxelGridView};
use isoterra_world::MesherKind;

pub use cube::CubeMarcher;
pub use march::{MarchScratch, march_grid, march_grid_with};
pub use tetra::TetraMarcher;

/// Lattice edge of the unit cube as a pair of corner indices
/// (see [`tables::CUBE_CORNERS`]).
pub type CubeEdge = [u8; 2];

/// Per-cube triangulation strategy plugged into [`march_grid`].
pub trait CubeClassifier: Send + Sync {
    /// Appends the triangles of one cube. `densities` follow
    /// [`tables::CUBE_CORNERS`] order; a corner is inside when its density
    /// is `<= surface`.
    fn triangulate(&self, densities: &[f32; 8], surface: f32, out: &mut Vec<[CubeEdge; 3]>);
}

/// Configuration byte: bit `i` set when corner `i` is inside.
#[inline]
pub fn cube_configuration(densities: &[f32; 8], surface: f32) -> u8 {
    densities
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &d)| if d <= surface { acc | (1 << i) } else { acc })
}

/// Interpolation parameter of the surface crossing between two samples.
/// Equal samples fall back to `surface` itself.
#[inline]
pub fn crossing_t(v0: f32, v1: f32, surface: f32) -> f32 {
    if v1 == v0 { surface } else { (surface - v0) / (v1 - v0) }
}

/// Mesher selected by configuration.
#[derive(Clone, Copy, Debug)]
pub enum Mesher {
    Cubes(CubeMarcher),
    Tetrahedra(TetraMarcher),
}

impl Mesher {
    pub fn new(kind: MesherKind) -> Self {
        match kind {
            MesherKind::Cubes => Mesher::Cubes(CubeMarcher),
            MesherKind::Tetrahedra => Mesher::Tetrahedra(TetraMarcher),
        }
    }

    pub fn kind(&self) -> MesherKind {
        match self {
            Mesher::Cubes(_) => MesherKind::Cubes,
            Mesher::Tetrahedra(_) => MesherKind::Tetrahedra,
        }
    }

    pub fn mesh(&self, grid: VoxelGridView<'_>, surface: f32) -> MeshBuffers {
        march_grid(grid, surface, self)
    }

    /// Like [`Self::mesh`] but reuses `scratch` allocations across calls.
    pub fn mesh_with(
        &self,
        grid: VoxelGridView<'_>,
        surface: f32,
        scratch: &mut MarchScratch,
    ) -> MeshBuffers {
        march_grid_with(grid, surface, self, scratch)
    }
}

impl Default for Mesher {
    fn default() -> Self {
        Mesher::new(MesherKind::default())
    }
}

impl CubeClassifier for Mesher {
    #[inline]
    fn triangulate(&self, densities: &[f32; 8], surface: f32, out: &mut Vec<[CubeEdge; 3]>) {
        match self {
            Mesher::Cubes(m) => m.triangulate(densities, surface, out),
            Mesher::Tetrahedra(m) => m.triangulate(densities, surface, out),
        }
    }
}
