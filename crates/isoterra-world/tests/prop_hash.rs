use isoterra_world::ChunkCoord;
use isoterra_world::hash::{self, BOUND};
use proptest::prelude::*;

fn axis() -> impl Strategy<Value = i32> {
    -BOUND..=BOUND
}

proptest! {
    // unpack(pack(p)) == p for every in-range coordinate
    #[test]
    fn pack_unpack_round_trip(x in axis(), y in axis(), z in axis()) {
        prop_assert_eq!(hash::unpack(hash::pack(x, y, z)), (x, y, z));
    }

    // distinct in-range coordinates never share a key
    #[test]
    fn pack_is_injective(a in (axis(), axis(), axis()), b in (axis(), axis(), axis())) {
        prop_assume!(a != b);
        prop_assert_ne!(hash::pack(a.0, a.1, a.2), hash::pack(b.0, b.1, b.2));
    }

    // ChunkCoord::packed agrees with the free function
    #[test]
    fn chunk_coord_packed_matches(x in axis(), y in axis(), z in axis()) {
        let c = ChunkCoord::new(x, y, z);
        prop_assert_eq!(c.packed().0, hash::pack(x, y, z));
        prop_assert_eq!(ChunkCoord::from(c.packed()), c);
    }
}
