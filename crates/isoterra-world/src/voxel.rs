use crate::material::MaterialKey;

/// One lattice sample: signed density plus a material id.
///
/// A voxel counts as inside the solid when `density <= surface`, where the
/// surface threshold is a single global value owned by the configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voxel {
    pub density: f32,
    pub material: i32,
}

impl Voxel {
    /// Far outside any solid, no material.
    pub const EMPTY: Voxel = Voxel {
        density: 1.0,
        material: 0,
    };

    #[inline]
    pub const fn new(density: f32, material: i32) -> Self {
        Self { density, material }
    }

    #[inline]
    pub fn with_key(density: f32, material: MaterialKey) -> Self {
        Self {
            density,
            material: material.0,
        }
    }

    #[inline]
    pub fn is_inside(self, surface: f32) -> bool {
        self.density <= surface
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self::EMPTY
    }
}
