use isoterra_chunk::{ChunkCoord, MeshBuffers};
use isoterra_geom::Vec3;

/// World placement of a chunk mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkTransform {
    pub position: Vec3,
    pub scale: f32,
}

impl ChunkTransform {
    pub fn for_chunk(coord: ChunkCoord, cubes_per_axis: usize, voxel_scale: f32) -> Self {
        Self {
            position: coord.world_position(cubes_per_axis, voxel_scale),
            scale: voxel_scale,
        }
    }
}

/// Consumer of finished meshes (renderer, collider host, recorder).
pub trait ChunkSink {
    fn apply(&mut self, coord: ChunkCoord, mesh: &MeshBuffers);
    fn set_transform(&mut self, coord: ChunkCoord, transform: ChunkTransform);
    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);
    fn set_collidable(&mut self, coord: ChunkCoord, collidable: bool);
    fn dispose(&mut self, coord: ChunkCoord);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_scales_chunk_origin() {
        let t = ChunkTransform::for_chunk(ChunkCoord::new(1, -2, 0), 16, 0.5);
        assert_eq!(t.position, Vec3::new(8.0, -16.0, 0.0));
        assert_eq!(t.scale, 0.5);
    }
}
