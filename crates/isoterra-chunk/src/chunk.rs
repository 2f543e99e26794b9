use isoterra_world::ChunkCoord;

use crate::grid::VoxelGrid;
use crate::mesh::MeshBuffers;

/// One resident chunk: private voxel copy, last mesh, and presentation state.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    grid: VoxelGrid,
    mesh: Option<MeshBuffers>,
    has_data: bool,
    visible: bool,
    collidable: bool,
    mesh_rev: u64,
}

impl Chunk {
    /// Registered-but-not-generated record; grid holds empty voxels.
    pub fn new_empty(coord: ChunkCoord, dim: usize) -> Self {
        Self {
            coord,
            grid: VoxelGrid::new(dim),
            mesh: None,
            has_data: false,
            visible: false,
            collidable: false,
            mesh_rev: 0,
        }
    }

    pub fn with_grid(coord: ChunkCoord, grid: VoxelGrid) -> Self {
        let mut c = Self::new_empty(coord, grid.dim());
        c.set_grid(grid);
        c
    }

    #[inline]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// In-place edit handle. Callers must re-mesh afterwards.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut VoxelGrid {
        &mut self.grid
    }

    pub fn set_grid(&mut self, grid: VoxelGrid) {
        debug_assert_eq!(grid.dim(), self.grid.dim());
        self.grid = grid;
        self.has_data = true;
    }

    /// True once the data backend has filled the grid.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    #[inline]
    pub fn mesh(&self) -> Option<&MeshBuffers> {
        self.mesh.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: MeshBuffers) {
        self.mesh = Some(mesh);
        self.mesh_rev += 1;
    }

    pub fn clear_mesh(&mut self) {
        self.mesh = None;
    }

    /// False when there is no mesh or the last mesh failed the probe.
    #[inline]
    pub fn is_physically_correct(&self) -> bool {
        self.mesh.as_ref().is_some_and(|m| m.is_physically_correct())
    }

    #[inline]
    pub fn mesh_rev(&self) -> u64 {
        self.mesh_rev
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn set_visible(&mut self, v: bool) {
        self.visible = v;
    }

    pub fn set_collidable(&mut self, v: bool) {
        self.collidable = v;
    }
}
