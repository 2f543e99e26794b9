use isoterra_geom::{Aabb, LatticePos, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_add_sub() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));

    let d = c - a;
    assert!(vec3_approx_eq(d, b, 1e-6));
}

#[test]
fn vec3_lerp_endpoints_and_midpoint() {
    let a = Vec3::new(0.0, 2.0, -4.0);
    let b = Vec3::new(2.0, 2.0, 4.0);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert!(vec3_approx_eq(a.lerp(b, 0.5), Vec3::new(1.0, 2.0, 0.0), 1e-6));
}

#[test]
fn vec3_cross_is_orthogonal() {
    let a = Vec3::new(1.0, 0.0, 0.0);
    let b = Vec3::new(0.0, 1.0, 0.0);
    assert!(vec3_approx_eq(a.cross(b), Vec3::new(0.0, 0.0, 1.0), 1e-6));
    assert!(vec3_approx_eq(b.cross(a), Vec3::new(0.0, 0.0, -1.0), 1e-6));
}

#[test]
fn vec3_non_finite_detected() {
    assert!(Vec3::ONE.is_finite());
    assert!(!Vec3::new(f32::NAN, 0.0, 0.0).is_finite());
    assert!(!Vec3::new(0.0, f32::INFINITY, 0.0).is_finite());
}

#[test]
fn aabb_from_points() {
    assert!(Aabb::from_points(std::iter::empty()).is_none());
    let b = Aabb::from_points([
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(-2.0, 3.0, 0.5),
        Vec3::new(0.0, 0.0, 4.0),
    ])
    .unwrap();
    assert_eq!(b.min, Vec3::new(-2.0, -1.0, 0.0));
    assert_eq!(b.max, Vec3::new(1.0, 3.0, 4.0));
    assert_eq!(b.size(), Vec3::new(3.0, 4.0, 4.0));
}

#[test]
fn lattice_axis_accessors() {
    let p = LatticePos::new(3, -4, 5);
    assert_eq!(p.axis(0), 3);
    assert_eq!(p.axis(1), -4);
    assert_eq!(p.axis(2), 5);
    assert_eq!(p.with_axis(1, 7), LatticePos::new(3, 7, 5));
    assert_eq!(p + LatticePos::splat(1), LatticePos::new(4, -3, 6));
    assert_eq!(p - p, LatticePos::ZERO);
}
