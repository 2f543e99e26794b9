//! Pluggable density/material sources sampled on the global lattice.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use isoterra_geom::{LatticePos, Vec3};

use crate::config::NoiseConfig;
use crate::material::MaterialKey;
use crate::voxel::Voxel;

/// Produces one voxel per global lattice point. Must be deterministic so
/// every chunk sharing a border plane samples identical values.
pub trait DensitySource: Send + Sync {
    fn sample(&self, p: LatticePos) -> Voxel;

    /// Fills a `dim^3` block starting at `origin`, x fastest.
    fn fill(&self, origin: LatticePos, dim: usize, out: &mut [Voxel]) {
        debug_assert_eq!(out.len(), dim * dim * dim);
        let mut i = 0;
        for z in 0..dim as i32 {
            for y in 0..dim as i32 {
                for x in 0..dim as i32 {
                    out[i] = self.sample(origin.offset(x, y, z));
                    i += 1;
                }
            }
        }
    }
}

/// Horizontal ground plane at `height`; density grows with altitude.
#[derive(Clone, Copy, Debug)]
pub struct FlatTerrain {
    pub height: f32,
    pub material: MaterialKey,
}

impl DensitySource for FlatTerrain {
    fn sample(&self, p: LatticePos) -> Voxel {
        Voxel::with_key(p.y as f32 - self.height, self.material)
    }
}

/// Signed distance to a ball.
#[derive(Clone, Copy, Debug)]
pub struct SphereTerrain {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialKey,
}

impl DensitySource for SphereTerrain {
    fn sample(&self, p: LatticePos) -> Voxel {
        let d = (p.to_vec3() - self.center).length() - self.radius;
        Voxel::with_key(d, self.material)
    }
}

/// Heightfield terrain with 3D cave carving and depth-banded materials.
pub struct NoiseTerrain {
    height: FastNoiseLite,
    caves: FastNoiseLite,
    amplitude: f32,
    base_height: f32,
    cave_threshold: f32,
    top: MaterialKey,
    sub: MaterialKey,
    deep: MaterialKey,
}

const TOP_DEPTH: f32 = 1.5;
const SUB_DEPTH: f32 = 5.0;

impl NoiseTerrain {
    /// `materials` are (top, sub-surface, deep) layer names; missing entries
    /// reuse the previous layer.
    pub fn new(cfg: &NoiseConfig, materials: &[String]) -> Self {
        let mut height = FastNoiseLite::with_seed(cfg.seed);
        height.set_noise_type(Some(NoiseType::OpenSimplex2));
        height.set_frequency(Some(cfg.frequency));
        let mut caves = FastNoiseLite::with_seed(cfg.seed ^ 41_337);
        caves.set_noise_type(Some(NoiseType::OpenSimplex2));
        caves.set_frequency(Some(cfg.cave_frequency));

        let key = |i: usize| {
            materials
                .get(i)
                .or_else(|| materials.last())
                .map(|s| MaterialKey::from_name(s))
                .unwrap_or(MaterialKey(0))
        };
        Self {
            height,
            caves,
            amplitude: cfg.amplitude,
            base_height: cfg.base_height,
            cave_threshold: cfg.cave_threshold,
            top: key(0),
            sub: key(1),
            deep: key(2),
        }
    }

    #[inline]
    pub fn height_at(&self, x: i32, z: i32) -> f32 {
        self.base_height + self.height.get_noise_2d(x as f32, z as f32) * self.amplitude
    }
}

impl DensitySource for NoiseTerrain {
    fn sample(&self, p: LatticePos) -> Voxel {
        let h = self.height_at(p.x, p.z);
        let mut density = p.y as f32 - h;
        if self.cave_threshold < 1.0 && density < 0.0 {
            let c = self.caves.get_noise_3d(p.x as f32, p.y as f32, p.z as f32);
            if c > self.cave_threshold {
                // carved points become air
                density = density.max((c - self.cave_threshold) * 4.0);
            }
        }
        let depth = h - p.y as f32;
        let material = if depth < TOP_DEPTH {
            self.top
        } else if depth < SUB_DEPTH {
            self.sub
        } else {
            self.deep
        };
        Voxel::with_key(density, material)
    }
}
