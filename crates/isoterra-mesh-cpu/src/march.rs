use std::collections::BTreeMap;

use hashbrown::HashMap;
use isoterra_chunk::{MeshBuffers, Voxel, VoxelGridView};
use isoterra_geom::Vec3;

use crate::tables::CUBE_CORNERS;
use crate::{CubeClassifier, CubeEdge, crossing_t};

/// Reusable working memory for [`march_grid_with`].
#[derive(Default, Debug)]
pub struct MarchScratch {
    welded: HashMap<(u32, u32), u32>,
    tris: Vec<[CubeEdge; 3]>,
    buckets: BTreeMap<i32, Vec<u32>>,
}

impl MarchScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all state but retains capacity for reuse across chunks.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.welded.clear();
        self.tris.clear();
        self.buckets.clear();
    }
}

/// Meshes every cube of `grid` with `classifier`.
pub fn march_grid<C: CubeClassifier + ?Sized>(
    grid: VoxelGridView<'_>,
    surface: f32,
    classifier: &C,
) -> MeshBuffers {
    let mut scratch = MarchScratch::new();
    march_grid_with(grid, surface, classifier, &mut scratch)
}

/// Shared outer walk for both classifiers.
///
/// Vertices are welded per lattice edge, so a crossing shared by several
/// cubes is emitted once. Every triangle of a cube takes the material of
/// the cube's origin sample. Winding is `[0, 1, 2]` for a non-negative
/// `surface` and `[0, 2, 1]` when its sign bit is set. Triangles that
/// collapse after welding or touch a non-finite vertex are dropped.
pub fn march_grid_with<C: CubeClassifier + ?Sized>(
    grid: VoxelGridView<'_>,
    surface: f32,
    classifier: &C,
    scratch: &mut MarchScratch,
) -> MeshBuffers {
    scratch.clear_keep_capacity();
    let dim = grid.dim();
    if dim < 2 {
        return MeshBuffers::default();
    }
    let voxels = grid.as_slice();
    let cubes = dim - 1;
    let flip = surface.is_sign_negative();
    let mut positions: Vec<Vec3> = Vec::new();
    let mut dropped = 0usize;

    for z in 0..cubes {
        for y in 0..cubes {
            for x in 0..cubes {
                let mut lattice = [0usize; 8];
                let mut densities = [0f32; 8];
                for (i, [ox, oy, oz]) in CUBE_CORNERS.iter().enumerate() {
                    let li = (x + ox) + (y + oy) * dim + (z + oz) * dim * dim;
                    lattice[i] = li;
                    densities[i] = voxels[li].density;
                }
                scratch.tris.clear();
                classifier.triangulate(&densities, surface, &mut scratch.tris);
                if scratch.tris.is_empty() {
                    continue;
                }
                let material = voxels[lattice[0]].material;
                for tri in &scratch.tris {
                    let mut ids = [0u32; 3];
                    for (k, [a, b]) in tri.iter().enumerate() {
                        ids[k] = weld(
                            &mut scratch.welded,
                            &mut positions,
                            voxels,
                            dim,
                            lattice[*a as usize],
                            lattice[*b as usize],
                            surface,
                        );
                    }
                    if ids[0] == ids[1] || ids[1] == ids[2] || ids[0] == ids[2] {
                        dropped += 1;
                        continue;
                    }
                    if ids.iter().any(|&i| !positions[i as usize].is_finite()) {
                        dropped += 1;
                        continue;
                    }
                    let wound = if flip {
                        [ids[0], ids[2], ids[1]]
                    } else {
                        ids
                    };
                    scratch
                        .buckets
                        .entry(material)
                        .or_default()
                        .extend_from_slice(&wound);
                }
            }
        }
    }

    if dropped > 0 {
        log::debug!(target: "mesh", "dropped {} degenerate triangles", dropped);
    }
    let buckets = std::mem::take(&mut scratch.buckets);
    MeshBuffers::from_buckets(positions, buckets)
}

/// Returns the vertex for lattice edge `a`-`b`, creating it on first use.
/// The lower lattice index is always the interpolation origin so every
/// cube sharing the edge computes the same point.
fn weld(
    welded: &mut HashMap<(u32, u32), u32>,
    positions: &mut Vec<Vec3>,
    voxels: &[Voxel],
    dim: usize,
    a: usize,
    b: usize,
    surface: f32,
) -> u32 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    *welded.entry((lo as u32, hi as u32)).or_insert_with(|| {
        let t = crossing_t(voxels[lo].density, voxels[hi].density, surface);
        positions.push(lattice_point(lo, dim).lerp(lattice_point(hi, dim), t));
        (positions.len() - 1) as u32
    })
}

#[inline]
fn lattice_point(i: usize, dim: usize) -> Vec3 {
    Vec3::new(
        (i % dim) as f32,
        ((i / dim) % dim) as f32,
        (i / (dim * dim)) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CubeMarcher;
    use isoterra_chunk::VoxelGrid;

    #[test]
    fn lattice_point_inverts_linear_index() {
        let g = VoxelGrid::new(5);
        assert_eq!(lattice_point(g.idx(3, 1, 4), 5), Vec3::new(3.0, 1.0, 4.0));
    }

    #[test]
    fn tiny_grid_yields_empty_mesh() {
        let g = VoxelGrid::filled(1, Voxel::new(-1.0, 0));
        let m = march_grid(g.view(), 0.0, &CubeMarcher);
        assert!(m.is_empty());
        assert!(!m.is_physically_correct());
    }

    #[test]
    fn neighbouring_cubes_share_vertices() {
        // solid slab below y = 0.5 spanning two cubes along x
        let mut g = VoxelGrid::filled(3, Voxel::new(1.0, 0));
        for z in 0..3 {
            for x in 0..3 {
                g.set(x, 0, z, Voxel::new(-1.0, 0));
            }
        }
        let m = march_grid(g.view(), 0.0, &CubeMarcher);
        // one crossing per vertical lattice edge: 3 x 3
        assert_eq!(m.vertex_count(), 9);
        assert_eq!(m.triangle_count(), 8);
        assert!(m.positions.iter().all(|p| p.y == 0.5));
    }

    #[test]
    fn scratch_reuse_gives_identical_output() {
        let mut g = VoxelGrid::filled(4, Voxel::new(1.0, 2));
        g.set(1, 1, 1, Voxel::new(-1.0, 2));
        let mut scratch = MarchScratch::new();
        let a = march_grid_with(g.view(), 0.0, &CubeMarcher, &mut scratch);
        let b = march_grid_with(g.view(), 0.0, &CubeMarcher, &mut scratch);
        assert_eq!(a, b);
        assert_eq!(a.triangle_count(), 8);
    }
}
