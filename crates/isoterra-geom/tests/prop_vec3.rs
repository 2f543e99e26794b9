use isoterra_geom::{Aabb, Vec3};
use proptest::num::f32::NORMAL;
use proptest::prelude::*;
use proptest::strategy::Strategy;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
fn vapprox(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

fn small_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e3)
}

fn small_vec3() -> impl Strategy<Value = Vec3> {
    (small_f32(), small_f32(), small_f32()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Addition commutativity: a + b == b + a (element-wise)
    #[test]
    fn vec3_add_commutative(a in small_vec3(), b in small_vec3()) {
        prop_assert!(vapprox(a + b, b + a, 1e-5));
    }

    // lerp stays inside the segment's bounding box for t in [0,1]
    #[test]
    fn lerp_within_bounds(a in small_vec3(), b in small_vec3(), t in 0.0f32..=1.0) {
        let p = a.lerp(b, t);
        let lo = a.min(b) - Vec3::splat(1e-3);
        let hi = a.max(b) + Vec3::splat(1e-3);
        prop_assert!(p.max(lo) == p && p.min(hi) == p);
    }

    // from_points contains every input point
    #[test]
    fn from_points_contains_inputs(pts in proptest::collection::vec(small_vec3(), 1..16)) {
        let b = Aabb::from_points(pts.iter().copied()).unwrap();
        for p in pts {
            prop_assert!(p.max(b.min) == p && p.min(b.max) == p);
        }
    }
}
