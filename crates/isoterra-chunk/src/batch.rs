use isoterra_world::Voxel;

use crate::grid::{VoxelGrid, VoxelGridView, VoxelGridViewMut};

/// Contiguous output buffer for one backend dispatch: `count` grids of
/// `dim^3` samples laid end to end. Reused across sub-batches so the
/// transient allocation stays bounded by the configured batch size.
#[derive(Debug, Default)]
pub struct GridBatch {
    dim: usize,
    count: usize,
    voxels: Vec<Voxel>,
}

impl GridBatch {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            count: 0,
            voxels: Vec::new(),
        }
    }

    /// Resizes for `count` grids, keeping capacity across calls.
    pub fn reset(&mut self, count: usize) {
        self.count = count;
        self.voxels.clear();
        self.voxels.resize(count * self.stride(), Voxel::EMPTY);
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Samples per grid.
    #[inline]
    pub fn stride(&self) -> usize {
        self.dim * self.dim * self.dim
    }

    pub fn view(&self, i: usize) -> VoxelGridView<'_> {
        let s = self.stride();
        VoxelGridView::new(self.dim, &self.voxels[i * s..(i + 1) * s])
    }

    pub fn view_mut(&mut self, i: usize) -> VoxelGridViewMut<'_> {
        let s = self.stride();
        VoxelGridViewMut::new(self.dim, &mut self.voxels[i * s..(i + 1) * s])
    }

    /// The whole buffer, for backends that split it themselves.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }

    pub fn to_grid(&self, i: usize) -> VoxelGrid {
        self.view(i).to_grid()
    }
}
