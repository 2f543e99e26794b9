use crate::tables::{CUBE_EDGES, EDGE_TABLE, TRI_TABLE};
use crate::{CubeClassifier, CubeEdge, cube_configuration};

/// Classic 256-configuration Marching Cubes; up to five triangles per cube.
#[derive(Clone, Copy, Debug, Default)]
pub struct CubeMarcher;

#[inline]
fn edge(e: i8) -> CubeEdge {
    let [a, b] = CUBE_EDGES[e as usize];
    [a as u8, b as u8]
}

impl CubeClassifier for CubeMarcher {
    fn triangulate(&self, densities: &[f32; 8], surface: f32, out: &mut Vec<[CubeEdge; 3]>) {
        let config = cube_configuration(densities, surface) as usize;
        if EDGE_TABLE[config] == 0 {
            return;
        }
        for tri in TRI_TABLE[config].chunks_exact(3) {
            if tri[0] < 0 {
                break;
            }
            out.push([edge(tri[0]), edge(tri[1]), edge(tri[2])]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tris(d: [f32; 8]) -> Vec<[CubeEdge; 3]> {
        let mut out = Vec::new();
        CubeMarcher.triangulate(&d, 0.0, &mut out);
        out
    }

    #[test]
    fn uniform_configurations_emit_nothing() {
        assert!(tris([1.0; 8]).is_empty());
        assert!(tris([-1.0; 8]).is_empty());
        // exactly on the surface counts as inside
        assert!(tris([0.0; 8]).is_empty());
    }

    #[test]
    fn edge_table_matches_triangle_table() {
        for (config, row) in TRI_TABLE.iter().enumerate() {
            let mask = row
                .iter()
                .filter(|&&e| e >= 0)
                .fold(0u16, |m, &e| m | (1 << e));
            assert_eq!(mask, EDGE_TABLE[config], "configuration {config:#04x}");
        }
    }

    #[test]
    fn at_most_five_triangles() {
        for row in TRI_TABLE.iter() {
            assert!(row.iter().take_while(|&&e| e >= 0).count() <= 15);
            assert_eq!(row[15], -1);
        }
    }
}
