use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use isoterra_chunk::{ChunkCoord, ChunkRegistry, MaterialRegistry, MeshBuffers};
use isoterra_edit::BrushShape;
use isoterra_geom::LatticePos;
use isoterra_runtime::{
    ChunkSink, ChunkTransform, CpuBackend, DataBackend, DeformOutcome, GenerationPipeline,
    PipelineEvent,
};
use isoterra_world::{MaterialKey, MesherKind, NoiseTerrain, TerrainConfig, load_config_from_path};

const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MesherArg {
    Cubes,
    Tetrahedra,
}

impl From<MesherArg> for MesherKind {
    fn from(m: MesherArg) -> Self {
        match m {
            MesherArg::Cubes => MesherKind::Cubes,
            MesherArg::Tetrahedra => MesherKind::Tetrahedra,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "isoterra")]
#[command(about = "Generate, mesh and sculpt a block of noise terrain", long_about = None)]
struct Cli {
    /// Terrain config (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Horizontal chunk radius around the origin
    #[arg(short, long, default_value_t = 2)]
    radius: i32,

    /// Override the noise seed
    #[arg(short, long)]
    seed: Option<i32>,

    /// Override the mesher variant
    #[arg(short, long, value_enum)]
    mesher: Option<MesherArg>,

    /// Number of sculpt strokes applied along the terrain surface
    #[arg(long, default_value_t = 0)]
    sculpt: u32,
}

/// Headless sink: records what a renderer would receive.
#[derive(Default)]
struct LoggingSink {
    meshes: usize,
    triangles: usize,
}

impl ChunkSink for LoggingSink {
    fn apply(&mut self, coord: ChunkCoord, mesh: &MeshBuffers) {
        self.meshes += 1;
        self.triangles += mesh.triangle_count();
        log::trace!(
            "mesh {:?}: {} verts, {} tris, {} materials",
            coord,
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.submeshes.len()
        );
    }

    fn set_transform(&mut self, coord: ChunkCoord, transform: ChunkTransform) {
        log::trace!("transform {:?}: {:?}", coord, transform);
    }

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        log::trace!("visible {:?}: {}", coord, visible);
    }

    fn set_collidable(&mut self, coord: ChunkCoord, collidable: bool) {
        log::trace!("collidable {:?}: {}", coord, collidable);
    }

    fn dispose(&mut self, coord: ChunkCoord) {
        log::trace!("dispose {:?}", coord);
    }
}

fn report(events: &[PipelineEvent]) {
    for e in events {
        match e {
            PipelineEvent::BatchCompleted { request, coords } => {
                log::info!("{:?} done: {} chunks", request, coords.len())
            }
            PipelineEvent::BatchCancelled { request } => log::warn!("{:?} cancelled", request),
            PipelineEvent::MeshRejected { coord } => log::debug!("{:?} has no usable surface", coord),
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => TerrainConfig::default(),
    };
    if let Some(seed) = cli.seed {
        cfg.noise.seed = seed;
    }
    if let Some(m) = cli.mesher {
        cfg.mesher = m.into();
    }
    cfg.validate()?;

    let materials = MaterialRegistry::from_names(cfg.materials.iter().map(String::as_str))?;
    let backend = Arc::new(CpuBackend::new(NoiseTerrain::new(&cfg.noise, &cfg.materials)));
    let data: Arc<dyn DataBackend> = backend.clone();
    let mut pipeline = GenerationPipeline::new(&cfg, data)?.with_materials(materials);
    let mut registry = ChunkRegistry::new(cfg.cubes_per_axis);
    let mut sink = LoggingSink::default();

    let n = cfg.cubes_per_axis as f32;
    let lo = ((cfg.noise.base_height - cfg.noise.amplitude) / n).floor() as i32 - 1;
    let hi = ((cfg.noise.base_height + cfg.noise.amplitude) / n).floor() as i32;
    let r = cli.radius.max(0);
    for cy in lo..=hi {
        let mut layer = Vec::new();
        for cz in -r..=r {
            for cx in -r..=r {
                layer.push(ChunkCoord::new(cx, cy, cz));
            }
        }
        pipeline.request_generate(layer);
    }
    log::info!(
        "generating {} layers of {} chunks ({:?})",
        hi - lo + 1,
        (2 * r + 1) * (2 * r + 1),
        cfg.mesher
    );
    let events = pipeline.pump_until_idle(&mut registry, &mut sink, IDLE_TIMEOUT)?;
    report(&events);
    pipeline.drain_fixed_step(&mut registry, &mut sink);

    let terrain = backend.source();
    let span = (2 * r + 1) * cfg.cubes_per_axis as i32;
    let paint = cfg
        .materials
        .first()
        .map(|s| MaterialKey::from_name(s))
        .unwrap_or(MaterialKey(0));
    for i in 0..cli.sculpt as i32 {
        let x = (i * 7).rem_euclid(span) - span / 2;
        let z = (i * 13).rem_euclid(span) - span / 2;
        let y = terrain.height_at(x, z).round() as i32;
        let delta = if i % 2 == 0 { 1.0 } else { -1.0 };
        let brush = BrushShape::Sphere { radius: 3 };
        match pipeline.deform(&mut registry, LatticePos::new(x, y, z), delta, paint.0, brush) {
            DeformOutcome::Applied { touched, .. } => {
                log::debug!("stroke {} at ({}, {}, {}) touched {} chunks", i, x, y, z, touched.len())
            }
            other => log::warn!("stroke {} skipped: {:?}", i, other),
        }
        let events = pipeline.pump_until_idle(&mut registry, &mut sink, IDLE_TIMEOUT)?;
        report(&events);
        pipeline.drain_fixed_step(&mut registry, &mut sink);
    }

    let stats = pipeline.stats();
    log::info!(
        "{} chunks resident, {} meshes applied ({} tris), {} degenerate, last job {} ms",
        registry.len(),
        sink.meshes,
        sink.triangles,
        stats.degenerate_meshes,
        stats.last_job_ms
    );
    let edits = pipeline.revisions().stats();
    log::info!("edits: {:?}", edits);
    Ok(())
}
