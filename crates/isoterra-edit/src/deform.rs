use isoterra_chunk::{ChunkCoord, ChunkRegistry};
use isoterra_geom::LatticePos;

use crate::brush::{BrushShape, ShapeCache};
use crate::resolver::resolve_global;

/// One sculpting stroke on the global lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeformRequest {
    pub point: LatticePos,
    /// Positive adds solid (lowers density), negative carves.
    pub delta: f32,
    pub material: i32,
    pub brush: BrushShape,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeformReport {
    /// Chunks whose voxels changed, sorted.
    pub touched: Vec<ChunkCoord>,
    /// Lattice points with at least one resident copy.
    pub points: usize,
    /// Voxel copies written across all chunks.
    pub writes: usize,
}

/// Applies `req` to every resident copy of every lattice point under the
/// brush. All copies of a point receive the same new value, read from the
/// first copy whose chunk holds generated data. Chunks that are absent or
/// registered without data are skipped.
pub fn apply_deform(
    registry: &mut ChunkRegistry,
    cache: &mut ShapeCache,
    req: &DeformRequest,
) -> DeformReport {
    let n = registry.cubes_per_axis();
    let samples = cache.samples(req.brush);
    let mut report = DeformReport::default();

    for s in samples.iter() {
        let p = req.point + s.offset;
        let set = resolve_global(p, n);
        let current = set.iter().find_map(|(c, l)| {
            registry
                .try_get(c)
                .filter(|chunk| chunk.has_data())
                .and_then(|chunk| chunk.grid().get_local(l))
        });
        let Some(mut v) = current else {
            continue;
        };
        v.density -= req.delta * s.weight;
        if req.delta > 0.0 {
            v.material = req.material;
        }
        let written = set.apply_to_registry(registry, |dst| *dst = v);
        if written == 0 {
            continue;
        }
        report.points += 1;
        report.writes += written;
        for c in set.chunks() {
            let live = registry.try_get(c).is_some_and(|chunk| chunk.has_data());
            if live && !report.touched.contains(&c) {
                report.touched.push(c);
            }
        }
    }
    report.touched.sort_unstable();
    log::debug!(
        target: "edit",
        "deform at {:?}: {} points, {} writes, {} chunks",
        req.point,
        report.points,
        report.writes,
        report.touched.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoterra_chunk::{Chunk, Voxel, VoxelGrid};

    fn registry(coords: &[(i32, i32, i32)], n: usize) -> ChunkRegistry {
        let mut r = ChunkRegistry::new(n);
        for &c in coords {
            let grid = VoxelGrid::filled(n + 1, Voxel::new(1.0, 0));
            r.add(Chunk::with_grid(c.into(), grid)).unwrap();
        }
        r
    }

    #[test]
    fn border_write_reaches_both_chunks() {
        let mut reg = registry(&[(0, 0, 0), (-1, 0, 0)], 8);
        let mut cache = ShapeCache::new();
        let req = DeformRequest {
            point: LatticePos::new(0, 4, 4),
            delta: 2.0,
            material: 9,
            brush: BrushShape::Cube { half_extent: 0 },
        };
        let report = apply_deform(&mut reg, &mut cache, &req);
        assert_eq!(report.points, 1);
        assert_eq!(report.writes, 2);
        assert_eq!(report.touched, vec![ChunkCoord::new(-1, 0, 0), ChunkCoord::new(0, 0, 0)]);
        let a = reg.try_get(ChunkCoord::new(0, 0, 0)).unwrap().grid().get(0, 4, 4);
        let b = reg.try_get(ChunkCoord::new(-1, 0, 0)).unwrap().grid().get(8, 4, 4);
        assert_eq!(a, b);
        assert_eq!(a, Voxel::new(-1.0, 9));
    }

    #[test]
    fn missing_neighbour_is_skipped() {
        let mut reg = registry(&[(0, 0, 0)], 8);
        let mut cache = ShapeCache::new();
        let req = DeformRequest {
            point: LatticePos::new(0, 0, 0),
            delta: -0.5,
            material: 9,
            brush: BrushShape::Cube { half_extent: 0 },
        };
        let report = apply_deform(&mut reg, &mut cache, &req);
        assert_eq!(report.writes, 1);
        assert_eq!(report.touched, vec![ChunkCoord::new(0, 0, 0)]);
        // carving keeps the old material
        let v = reg.try_get(ChunkCoord::new(0, 0, 0)).unwrap().grid().get(0, 0, 0);
        assert_eq!(v, Voxel::new(1.5, 0));
    }

    #[test]
    fn neighbour_without_data_keeps_real_border_value() {
        let mut reg = ChunkRegistry::new(4);
        let solid = VoxelGrid::filled(5, Voxel::new(-1.5, 3));
        reg.add(Chunk::with_grid(ChunkCoord::new(0, 0, 0), solid)).unwrap();
        reg.add(Chunk::new_empty(ChunkCoord::new(1, 0, 0), 5)).unwrap();
        let mut cache = ShapeCache::new();
        // x = 4 is chunk 1's min plane, so chunk 1 is resolved first
        let req = DeformRequest {
            point: LatticePos::new(4, 0, 2),
            delta: 0.1,
            material: 3,
            brush: BrushShape::Cube { half_extent: 0 },
        };
        let report = apply_deform(&mut reg, &mut cache, &req);
        assert_eq!(report.writes, 1);
        assert_eq!(report.touched, vec![ChunkCoord::new(0, 0, 0)]);
        let v = reg.try_get(ChunkCoord::new(0, 0, 0)).unwrap().grid().get(4, 0, 2);
        assert_eq!(v, Voxel::new(-1.6, 3));
        let empty = reg.try_get(ChunkCoord::new(1, 0, 0)).unwrap();
        assert_eq!(empty.grid().get(0, 0, 2), Voxel::EMPTY);
    }

    #[test]
    fn stroke_outside_resident_space_is_a_no_op() {
        let mut reg = registry(&[(0, 0, 0)], 8);
        let mut cache = ShapeCache::new();
        let req = DeformRequest {
            point: LatticePos::new(100, 100, 100),
            delta: 1.0,
            material: 1,
            brush: BrushShape::Sphere { radius: 2 },
        };
        assert_eq!(apply_deform(&mut reg, &mut cache, &req), DeformReport::default());
    }
}
