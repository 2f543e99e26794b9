use isoterra_geom::Vec3;

use crate::tables::CUBE_CORNERS;
use crate::{CubeClassifier, CubeEdge, crossing_t};

/// Six tetrahedra fanned around the 0-6 main diagonal. Opposite faces of
/// neighbouring cubes get matching diagonals, so the output is crack-free.
const TETRAHEDRA: [[u8; 4]; 6] = [
    [0, 6, 1, 2],
    [0, 6, 2, 3],
    [0, 6, 3, 7],
    [0, 6, 7, 4],
    [0, 6, 4, 5],
    [0, 6, 5, 1],
];

/// Tetrahedron edges as local corner pairs.
const TET_EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];

/// Up to two triangles per configuration, `-1` terminated. Orientation is
/// fixed up at emit time because the six tetrahedra alternate handedness.
const TET_TRIS: [[i8; 7]; 16] = [
    [-1, -1, -1, -1, -1, -1, -1],
    [0, 2, 3, -1, -1, -1, -1],
    [0, 1, 4, -1, -1, -1, -1],
    [2, 1, 4, 2, 4, 3, -1],
    [1, 2, 5, -1, -1, -1, -1],
    [0, 1, 5, 0, 5, 3, -1],
    [0, 4, 5, 0, 5, 2, -1],
    [3, 4, 5, -1, -1, -1, -1],
    [3, 4, 5, -1, -1, -1, -1],
    [0, 4, 5, 0, 5, 2, -1],
    [0, 1, 5, 0, 5, 3, -1],
    [1, 2, 5, -1, -1, -1, -1],
    [2, 1, 4, 2, 4, 3, -1],
    [0, 1, 4, -1, -1, -1, -1],
    [0, 2, 3, -1, -1, -1, -1],
    [-1, -1, -1, -1, -1, -1, -1],
];

/// Marching Tetrahedra: no ambiguous configurations, more triangles.
#[derive(Clone, Copy, Debug, Default)]
pub struct TetraMarcher;

#[inline]
fn corner_pos(c: u8) -> Vec3 {
    let [x, y, z] = CUBE_CORNERS[c as usize];
    Vec3::new(x as f32, y as f32, z as f32)
}

impl CubeClassifier for TetraMarcher {
    fn triangulate(&self, densities: &[f32; 8], surface: f32, out: &mut Vec<[CubeEdge; 3]>) {
        for tet in &TETRAHEDRA {
            let mut config = 0usize;
            let mut inside = Vec3::ZERO;
            let mut outside = Vec3::ZERO;
            for (i, &c) in tet.iter().enumerate() {
                if densities[c as usize] <= surface {
                    config |= 1 << i;
                    inside += corner_pos(c);
                } else {
                    outside += corner_pos(c);
                }
            }
            if config == 0 || config == 0xF {
                continue;
            }
            // points from the empty side into the solid
            let inward = inside / config.count_ones() as f32
                - outside / (4 - config.count_ones()) as f32;

            let edge = |e: i8| -> CubeEdge {
                let [a, b] = TET_EDGES[e as usize];
                [tet[a], tet[b]]
            };
            let point = |[a, b]: CubeEdge| {
                let t = crossing_t(densities[a as usize], densities[b as usize], surface);
                corner_pos(a).lerp(corner_pos(b), t)
            };
            for tri in TET_TRIS[config].chunks_exact(3) {
                if tri[0] < 0 {
                    break;
                }
                let mut t = [edge(tri[0]), edge(tri[1]), edge(tri[2])];
                let (p0, p1, p2) = (point(t[0]), point(t[1]), point(t[2]));
                if (p1 - p0).cross(p2 - p0).dot(inward) < 0.0 {
                    t.swap(1, 2);
                }
                out.push(t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetrahedra_share_the_main_diagonal() {
        for tet in &TETRAHEDRA {
            assert_eq!(&tet[..2], &[0, 6]);
        }
    }

    #[test]
    fn complement_configurations_cross_the_same_edges() {
        for config in 0..16usize {
            let mut a: Vec<i8> = TET_TRIS[config].iter().copied().filter(|&e| e >= 0).collect();
            let mut b: Vec<i8> = TET_TRIS[15 - config].iter().copied().filter(|&e| e >= 0).collect();
            a.sort_unstable();
            b.sort_unstable();
            a.dedup();
            b.dedup();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn crossed_edges_join_inside_and_outside_corners() {
        for config in 1..15usize {
            for &e in TET_TRIS[config].iter().filter(|&&e| e >= 0) {
                let [a, b] = TET_EDGES[e as usize];
                let ia = config & (1 << a) != 0;
                let ib = config & (1 << b) != 0;
                assert_ne!(ia, ib, "config {config} edge {e}");
            }
        }
    }

    #[test]
    fn single_inside_corner_fans_around_it() {
        let mut d = [1.0f32; 8];
        d[0] = -1.0;
        let mut out = Vec::new();
        TetraMarcher.triangulate(&d, 0.0, &mut out);
        assert_eq!(out.len(), 6);
        for tri in &out {
            assert!(tri.iter().all(|e| e.contains(&0)));
        }
    }
}
