use isoterra_chunk::{Chunk, ChunkCoord, ChunkRegistry, Voxel, VoxelGrid};
use isoterra_edit::{BrushShape, DeformRequest, ShapeCache, apply_deform, resolve, resolve_global};
use isoterra_geom::LatticePos;
use proptest::prelude::*;

fn boundary_axes(local: LatticePos, n: i32) -> u32 {
    (0..3)
        .filter(|&a| local.axis(a) == 0 || local.axis(a) == n)
        .count() as u32
}

proptest! {
    // 1, 2, 4, or 8 copies depending on how many axes sit on a border plane
    #[test]
    fn copy_count_is_power_of_boundary_axes(
        n in 1usize..=16,
        c in (-50i32..50, -50i32..50, -50i32..50),
        l in (0i32..=16, 0i32..=16, 0i32..=16),
    ) {
        let ni = n as i32;
        let local = LatticePos::new(l.0.min(ni), l.1.min(ni), l.2.min(ni));
        let chunk = ChunkCoord::from(c);
        let set = resolve(chunk, local, n);
        prop_assert_eq!(set.len() as u32, 1u32 << boundary_axes(local, ni));
        // no duplicates and every copy is in range
        let items = set.as_slice();
        for (i, a) in items.iter().enumerate() {
            prop_assert!(!items[i + 1..].contains(a));
            prop_assert!((0..3).all(|ax| (0..=ni).contains(&a.1.axis(ax))));
        }
    }

    // every copy addresses the same global lattice point
    #[test]
    fn copies_agree_on_global_position(
        n in 1usize..=16,
        p in (-200i32..200, -200i32..200, -200i32..200),
    ) {
        let p = LatticePos::from(p);
        for (c, l) in resolve_global(p, n).iter() {
            prop_assert_eq!(c.origin(n) + l, p);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // after any stroke, shared border planes stay identical
    #[test]
    fn deform_keeps_borders_seamless(
        point in (-6i32..14, -6i32..14, -6i32..14),
        radius in 0u32..4,
        delta in -2.0f32..2.0,
    ) {
        let n = 6usize;
        let mut reg = ChunkRegistry::new(n);
        for cz in -1..=1 {
            for cy in -1..=1 {
                for cx in -1..=1 {
                    let grid = VoxelGrid::filled(n + 1, Voxel::new(0.25, 0));
                    reg.add(Chunk::with_grid(ChunkCoord::new(cx, cy, cz), grid)).unwrap();
                }
            }
        }
        let mut cache = ShapeCache::new();
        let req = DeformRequest {
            point: LatticePos::from(point),
            delta,
            material: 3,
            brush: BrushShape::Sphere { radius },
        };
        apply_deform(&mut reg, &mut cache, &req);

        let ni = n as i32;
        for chunk in reg.iter() {
            for z in 0..=ni {
                for y in 0..=ni {
                    for x in 0..=ni {
                        let l = LatticePos::new(x, y, z);
                        let mine = chunk.grid().get_local(l);
                        for (c, other) in resolve(chunk.coord, l, n).iter() {
                            if let Some(peer) = reg.try_get(c) {
                                prop_assert_eq!(mine, peer.grid().get_local(other));
                            }
                        }
                    }
                }
            }
        }
    }
}
