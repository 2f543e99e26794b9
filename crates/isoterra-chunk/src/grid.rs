use isoterra_geom::LatticePos;
use isoterra_world::Voxel;

#[inline(always)]
fn linear(dim: usize, x: usize, y: usize, z: usize) -> usize {
    debug_assert!(
        x < dim && y < dim && z < dim,
        "voxel ({x}, {y}, {z}) outside grid of {dim}^3"
    );
    x + y * dim + z * dim * dim
}

/// Dense cubic voxel store of `dim^3` samples, `dim = cubes_per_axis + 1`.
///
/// The last plane on each axis duplicates the first plane of the next chunk;
/// each chunk keeps its own copy and edits keep the copies in sync.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid {
    dim: usize,
    voxels: Vec<Voxel>,
}

impl VoxelGrid {
    pub fn new(dim: usize) -> Self {
        Self::filled(dim, Voxel::EMPTY)
    }

    pub fn filled(dim: usize, v: Voxel) -> Self {
        Self {
            dim,
            voxels: vec![v; dim * dim * dim],
        }
    }

    /// Wraps existing samples, padding or truncating to `dim^3`.
    pub fn from_voxels(dim: usize, voxels: Vec<Voxel>) -> Self {
        let mut v = voxels;
        let expect = dim * dim * dim;
        if v.len() != expect {
            v.resize(expect, Voxel::EMPTY);
        }
        Self { dim, voxels: v }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn cubes_per_axis(&self) -> usize {
        self.dim.saturating_sub(1)
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        linear(self.dim, x, y, z)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[linear(self.dim, x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: Voxel) {
        let i = linear(self.dim, x, y, z);
        self.voxels[i] = v;
    }

    #[inline]
    pub fn contains_local(&self, p: LatticePos) -> bool {
        let d = self.dim as i32;
        p.x >= 0 && p.y >= 0 && p.z >= 0 && p.x < d && p.y < d && p.z < d
    }

    /// Checked read for callers holding signed local positions.
    #[inline]
    pub fn get_local(&self, p: LatticePos) -> Option<Voxel> {
        if !self.contains_local(p) {
            return None;
        }
        Some(self.get(p.x as usize, p.y as usize, p.z as usize))
    }

    /// Checked write; returns false when `p` lies outside the grid.
    #[inline]
    pub fn set_local(&mut self, p: LatticePos, v: Voxel) -> bool {
        if !self.contains_local(p) {
            return false;
        }
        self.set(p.x as usize, p.y as usize, p.z as usize, v);
        true
    }

    #[inline]
    pub fn as_slice(&self) -> &[Voxel] {
        &self.voxels
    }

    #[inline]
    pub fn view(&self) -> VoxelGridView<'_> {
        VoxelGridView {
            dim: self.dim,
            voxels: &self.voxels,
        }
    }

    #[inline]
    pub fn view_mut(&mut self) -> VoxelGridViewMut<'_> {
        VoxelGridViewMut {
            dim: self.dim,
            voxels: &mut self.voxels,
        }
    }
}

/// Read-only window over `dim^3` samples owned elsewhere.
#[derive(Clone, Copy, Debug)]
pub struct VoxelGridView<'a> {
    dim: usize,
    voxels: &'a [Voxel],
}

impl<'a> VoxelGridView<'a> {
    pub fn new(dim: usize, voxels: &'a [Voxel]) -> Self {
        assert_eq!(voxels.len(), dim * dim * dim, "view length does not match dim^3");
        Self { dim, voxels }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[linear(self.dim, x, y, z)]
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [Voxel] {
        self.voxels
    }

    pub fn to_grid(&self) -> VoxelGrid {
        VoxelGrid {
            dim: self.dim,
            voxels: self.voxels.to_vec(),
        }
    }
}

/// Mutable window over `dim^3` samples; the borrow ends with the owning buffer's scope.
#[derive(Debug)]
pub struct VoxelGridViewMut<'a> {
    dim: usize,
    voxels: &'a mut [Voxel],
}

impl<'a> VoxelGridViewMut<'a> {
    pub fn new(dim: usize, voxels: &'a mut [Voxel]) -> Self {
        assert_eq!(voxels.len(), dim * dim * dim, "view length does not match dim^3");
        Self { dim, voxels }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Voxel {
        self.voxels[linear(self.dim, x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: Voxel) {
        let i = linear(self.dim, x, y, z);
        self.voxels[i] = v;
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Voxel] {
        &mut *self.voxels
    }

    #[inline]
    pub fn as_view(&self) -> VoxelGridView<'_> {
        VoxelGridView {
            dim: self.dim,
            voxels: &*self.voxels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_voxels_pads_short_input() {
        let g = VoxelGrid::from_voxels(3, vec![Voxel::new(-1.0, 2); 5]);
        assert_eq!(g.as_slice().len(), 27);
        assert_eq!(g.get(1, 0, 0), Voxel::new(-1.0, 2));
        assert_eq!(g.get(2, 2, 2), Voxel::EMPTY);
    }

    #[test]
    fn checked_access_rejects_outside() {
        let mut g = VoxelGrid::new(4);
        assert!(g.get_local(LatticePos::new(-1, 0, 0)).is_none());
        assert!(g.get_local(LatticePos::new(0, 4, 0)).is_none());
        assert!(!g.set_local(LatticePos::new(0, 0, 4), Voxel::new(0.0, 1)));
        assert!(g.set_local(LatticePos::new(3, 3, 3), Voxel::new(0.0, 1)));
        assert_eq!(g.get(3, 3, 3).material, 1);
    }

    #[test]
    fn views_share_addressing_with_grid() {
        let mut g = VoxelGrid::new(3);
        {
            let mut v = g.view_mut();
            v.set(2, 1, 0, Voxel::new(-0.5, 9));
            assert_eq!(v.as_view().get(2, 1, 0).material, 9);
        }
        assert_eq!(g.view().get(2, 1, 0), Voxel::new(-0.5, 9));
        assert_eq!(g.idx(2, 1, 0), 2 + 3);
        assert_eq!(g.view().to_grid(), g);
    }
}
