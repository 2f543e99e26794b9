use criterion::{Criterion, black_box, criterion_group, criterion_main};

use isoterra_chunk::{Voxel, VoxelGrid};
use isoterra_geom::LatticePos;
use isoterra_mesh_cpu::{MarchScratch, Mesher};
use isoterra_world::{DensitySource, MesherKind, NoiseConfig, NoiseTerrain};

fn noise_grid(dim: usize) -> VoxelGrid {
    let materials = vec!["grass".to_string(), "dirt".to_string(), "stone".to_string()];
    let terrain = NoiseTerrain::new(&NoiseConfig::default(), &materials);
    let mut buf = vec![Voxel::EMPTY; dim * dim * dim];
    // straddle the surface so most cubes are mixed
    terrain.fill(LatticePos::new(0, -(dim as i32) / 2, 0), dim, &mut buf);
    VoxelGrid::from_voxels(dim, buf)
}

fn bench_march_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("march_noise");
    let grid = noise_grid(33);
    for kind in [MesherKind::Cubes, MesherKind::Tetrahedra] {
        let mesher = Mesher::new(kind);
        let mut scratch = MarchScratch::new();
        group.bench_function(format!("{kind:?}_32"), |b| {
            b.iter(|| {
                let out = mesher.mesh_with(grid.view(), 0.0, &mut scratch);
                black_box(out);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_march_noise);
criterion_main!(benches);
