use isoterra_geom::{Aabb, Vec3};

/// Index range of one material inside [`MeshBuffers::indices`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub material: i32,
    pub start: u32,
    pub count: u32,
}

/// Triangle mesh of one chunk, positions in chunk-local lattice units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    /// Triangle list grouped by material, in `submeshes` order.
    pub indices: Vec<u32>,
    pub submeshes: Vec<SubMesh>,
    is_physically_correct: bool,
}

impl MeshBuffers {
    /// Concatenates per-material index lists (already in ascending material
    /// order) into one buffer and runs the degeneracy probe.
    pub fn from_buckets<I>(positions: Vec<Vec3>, buckets: I) -> Self
    where
        I: IntoIterator<Item = (i32, Vec<u32>)>,
    {
        let mut indices = Vec::new();
        let mut submeshes = Vec::new();
        for (material, list) in buckets {
            if list.is_empty() {
                continue;
            }
            submeshes.push(SubMesh {
                material,
                start: indices.len() as u32,
                count: list.len() as u32,
            });
            indices.extend_from_slice(&list);
        }
        let is_physically_correct = probe_physically_correct(&positions, &indices);
        Self {
            positions,
            indices,
            submeshes,
            is_physically_correct,
        }
    }

    #[inline]
    pub fn is_physically_correct(&self) -> bool {
        self.is_physically_correct
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn submesh_indices(&self, sm: &SubMesh) -> &[u32] {
        let start = sm.start as usize;
        &self.indices[start..start + sm.count as usize]
    }

    pub fn triangle(&self, t: usize) -> [Vec3; 3] {
        let i = t * 3;
        [
            self.positions[self.indices[i] as usize],
            self.positions[self.indices[i + 1] as usize],
            self.positions[self.indices[i + 2] as usize],
        ]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| self.triangle(t))
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }
}

const PROBE_SAMPLES: usize = 32;

/// Cheap sanity check before a mesh reaches render/collision consumers.
///
/// Samples up to [`PROBE_SAMPLES`] triangles at an even stride and passes
/// when at least one sampled triangle has finite corners that do not all
/// coincide. Empty meshes fail: there is nothing to hand over.
pub fn probe_physically_correct(positions: &[Vec3], indices: &[u32]) -> bool {
    let tris = indices.len() / 3;
    if tris == 0 {
        return false;
    }
    let samples = tris.min(PROBE_SAMPLES);
    let stride = tris / samples;
    for s in 0..samples {
        let i = s * stride * 3;
        let corner = |k: usize| positions.get(indices[i + k] as usize).copied();
        let (Some(a), Some(b), Some(c)) = (corner(0), corner(1), corner(2)) else {
            continue;
        };
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            continue;
        }
        if a != b || b != c {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_become_contiguous_submeshes() {
        let positions = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let m = MeshBuffers::from_buckets(
            positions,
            vec![(-4, vec![0, 1, 2]), (2, Vec::new()), (7, vec![2, 1, 0, 0, 1, 2])],
        );
        assert_eq!(
            m.submeshes,
            vec![
                SubMesh { material: -4, start: 0, count: 3 },
                SubMesh { material: 7, start: 3, count: 6 },
            ]
        );
        assert_eq!(m.triangle_count(), 3);
        assert_eq!(m.submesh_indices(&m.submeshes[1]), &[2, 1, 0, 0, 1, 2]);
        assert!(m.is_physically_correct());
    }

    #[test]
    fn collapsed_mesh_fails_probe() {
        let p = Vec3::splat(0.5);
        assert!(!probe_physically_correct(&[p, p, p], &[0, 1, 2]));
        assert!(!probe_physically_correct(&[p], &[0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn empty_mesh_fails_probe() {
        let m = MeshBuffers::from_buckets(Vec::new(), Vec::<(i32, Vec<u32>)>::new());
        assert!(m.is_empty());
        assert!(!m.is_physically_correct());
        assert!(m.bounds().is_none());
    }

    #[test]
    fn non_finite_corners_are_ignored() {
        let nan = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(!probe_physically_correct(&[nan, Vec3::ZERO, Vec3::ONE], &[0, 1, 2]));
    }
}
