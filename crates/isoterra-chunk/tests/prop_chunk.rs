use isoterra_chunk::{Chunk, ChunkCoord, ChunkRegistry, Voxel, VoxelGrid};
use isoterra_geom::LatticePos;
use proptest::prelude::*;

fn dim() -> impl Strategy<Value = usize> {
    2usize..=9
}

fn small_i32() -> impl Strategy<Value = i32> {
    -1_000i32..=1_000
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(d in dim()) {
        let g = VoxelGrid::new(d);
        let expect = d * d * d;
        let mut seen = vec![false; expect];
        for z in 0..d { for y in 0..d { for x in 0..d {
            let i = g.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // idx follows x + y*W + z*W*H
    #[test]
    fn idx_is_x_fastest(d in dim(), x in 0usize..9, y in 0usize..9, z in 0usize..9) {
        prop_assume!(x < d && y < d && z < d);
        let g = VoxelGrid::new(d);
        prop_assert_eq!(g.idx(x, y, z), x + y * d + z * d * d);
    }

    // set then get returns the written voxel and leaves others untouched
    #[test]
    fn set_get_roundtrip(d in dim(), x in 0usize..9, y in 0usize..9, z in 0usize..9, dens in -10.0f32..10.0, mat in any::<i32>()) {
        prop_assume!(x < d && y < d && z < d);
        let mut g = VoxelGrid::new(d);
        let v = Voxel::new(dens, mat);
        g.set(x, y, z, v);
        prop_assert_eq!(g.get(x, y, z), v);
        let changed = g.as_slice().iter().filter(|s| **s != Voxel::EMPTY).count();
        prop_assert!(changed <= 1);
    }

    // region queries return exactly the resident chunks whose footprint touches the box
    #[test]
    fn region_matches_brute_force(
        coords in proptest::collection::hash_set((-3i32..=3, -3i32..=3, -3i32..=3), 0..20),
        min in (small_i32(), small_i32(), small_i32()),
        ext in (0i32..40, 0i32..40, 0i32..40),
    ) {
        let n = 8usize;
        let mut reg = ChunkRegistry::new(n);
        for c in &coords {
            reg.add(Chunk::new_empty((*c).into(), n + 1)).unwrap();
        }
        let lo = LatticePos::new(min.0 % 40, min.1 % 40, min.2 % 40);
        let hi = lo + LatticePos::new(ext.0, ext.1, ext.2);
        let got = reg.coords_in_region(lo, hi);
        let ni = n as i32;
        let mut want: Vec<ChunkCoord> = coords.iter().map(|c| ChunkCoord::from(*c)).filter(|c| {
            (0..3).all(|a| {
                let o = c.axis(a) * ni;
                o <= hi.axis(a) && o + ni >= lo.axis(a)
            })
        }).collect();
        want.sort_unstable();
        prop_assert_eq!(got, want);
    }
}
