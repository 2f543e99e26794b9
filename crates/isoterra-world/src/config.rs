use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_cubes_per_axis")]
    pub cubes_per_axis: usize,
    #[serde(default)]
    pub surface: f32,
    #[serde(default = "default_voxel_scale")]
    pub voxel_scale: f32,
    #[serde(default)]
    pub mesher: MesherKind,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_dispose_batch")]
    pub dispose_batch: usize,
    #[serde(default = "default_dispose_delay_ticks")]
    pub dispose_delay_ticks: u32,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default = "default_materials")]
    pub materials: Vec<String>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            cubes_per_axis: default_cubes_per_axis(),
            surface: 0.0,
            voxel_scale: default_voxel_scale(),
            mesher: MesherKind::default(),
            batch_size: default_batch_size(),
            dispose_batch: default_dispose_batch(),
            dispose_delay_ticks: default_dispose_delay_ticks(),
            noise: NoiseConfig::default(),
            materials: default_materials(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MesherKind {
    #[default]
    Cubes,
    Tetrahedra,
}

fn default_cubes_per_axis() -> usize {
    crate::CUBES_PER_AXIS
}
fn default_voxel_scale() -> f32 {
    1.0
}
fn default_batch_size() -> usize {
    32
}
fn default_dispose_batch() -> usize {
    8
}
fn default_dispose_delay_ticks() -> u32 {
    2
}
fn default_materials() -> Vec<String> {
    vec!["grass".to_string(), "dirt".to_string(), "stone".to_string()]
}

#[derive(Clone, Debug, Deserialize)]
pub struct NoiseConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default)]
    pub base_height: f32,
    #[serde(default = "default_cave_frequency")]
    pub cave_frequency: f32,
    /// Cave noise above this value carves air; values >= 1 disable caves.
    #[serde(default = "default_cave_threshold")]
    pub cave_threshold: f32,
}

fn default_seed() -> i32 {
    1337
}
fn default_frequency() -> f32 {
    0.02
}
fn default_amplitude() -> f32 {
    12.0
}
fn default_cave_frequency() -> f32 {
    0.05
}
fn default_cave_threshold() -> f32 {
    0.55
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            frequency: default_frequency(),
            amplitude: default_amplitude(),
            base_height: 0.0,
            cave_frequency: default_cave_frequency(),
            cave_threshold: default_cave_threshold(),
        }
    }
}

impl TerrainConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TerrainConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.cubes_per_axis == 0 {
            return Err("cubes_per_axis must be at least 1".into());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".into());
        }
        if self.dispose_batch == 0 {
            return Err("dispose_batch must be at least 1".into());
        }
        if !(self.voxel_scale.is_finite() && self.voxel_scale > 0.0) {
            return Err(format!("voxel_scale must be positive, got {}", self.voxel_scale).into());
        }
        if !self.surface.is_finite() {
            return Err("surface must be finite".into());
        }
        Ok(())
    }

    /// Samples per chunk axis, including the shared border plane.
    #[inline]
    pub fn grid_dim(&self) -> usize {
        self.cubes_per_axis + 1
    }
}

pub fn load_config_from_path(path: &Path) -> Result<TerrainConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg = TerrainConfig::from_toml_str(&s)?;
    log::info!("terrain config loaded from {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = TerrainConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.cubes_per_axis, 16);
        assert_eq!(cfg.surface, 0.0);
        assert_eq!(cfg.mesher, MesherKind::Cubes);
        assert_eq!(cfg.grid_dim(), 17);
        assert_eq!(cfg.noise.seed, 1337);
        assert_eq!(cfg.materials.len(), 3);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = TerrainConfig::from_toml_str(
            r#"
            cubes_per_axis = 8
            surface = -0.25
            mesher = "tetrahedra"
            batch_size = 4

            [noise]
            seed = 7
            cave_threshold = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cubes_per_axis, 8);
        assert_eq!(cfg.surface, -0.25);
        assert_eq!(cfg.mesher, MesherKind::Tetrahedra);
        assert_eq!(cfg.batch_size, 4);
        assert_eq!(cfg.noise.seed, 7);
        assert_eq!(cfg.noise.frequency, 0.02);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(TerrainConfig::from_toml_str("cubes_per_axis = 0").is_err());
        assert!(TerrainConfig::from_toml_str("batch_size = 0").is_err());
        assert!(TerrainConfig::from_toml_str("voxel_scale = -1.0").is_err());
        assert!(TerrainConfig::from_toml_str("mesher = \"octree\"").is_err());
    }
}
