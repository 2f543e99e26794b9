use isoterra_geom::{LatticePos, Vec3};
use serde::{Deserialize, Serialize};

use crate::hash::{self, PackedCoord};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn axis(self, i: usize) -> i32 {
        match i {
            0 => self.cx,
            1 => self.cy,
            _ => self.cz,
        }
    }

    #[inline]
    pub fn with_axis(mut self, i: usize, v: i32) -> Self {
        match i {
            0 => self.cx = v,
            1 => self.cy = v,
            _ => self.cz = v,
        }
        self
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    /// Packed registry key. Coordinates must lie within [`hash::BOUND`].
    #[inline]
    pub fn packed(self) -> PackedCoord {
        PackedCoord(hash::pack(self.cx, self.cy, self.cz))
    }

    /// Global lattice position of this chunk's local origin.
    #[inline]
    pub fn origin(self, cubes_per_axis: usize) -> LatticePos {
        let n = cubes_per_axis as i32;
        LatticePos::new(self.cx * n, self.cy * n, self.cz * n)
    }

    /// Chunk owning a global lattice point; border points belong to the chunk
    /// where they are local index 0.
    #[inline]
    pub fn containing(p: LatticePos, cubes_per_axis: usize) -> Self {
        let n = cubes_per_axis as i32;
        Self::new(p.x.div_euclid(n), p.y.div_euclid(n), p.z.div_euclid(n))
    }

    /// World-space placement of the chunk for the render/collision host.
    #[inline]
    pub fn world_position(self, cubes_per_axis: usize, voxel_scale: f32) -> Vec3 {
        self.origin(cubes_per_axis).to_vec3() * voxel_scale
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

impl From<PackedCoord> for ChunkCoord {
    fn from(value: PackedCoord) -> Self {
        let (cx, cy, cz) = hash::unpack(value.0);
        Self::new(cx, cy, cz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_handles_negative_points() {
        let n = 16;
        assert_eq!(ChunkCoord::containing(LatticePos::new(0, 0, 0), n), ChunkCoord::new(0, 0, 0));
        assert_eq!(ChunkCoord::containing(LatticePos::new(15, 16, -1), n), ChunkCoord::new(0, 1, -1));
        assert_eq!(ChunkCoord::containing(LatticePos::new(-16, -17, 31), n), ChunkCoord::new(-1, -2, 1));
    }

    #[test]
    fn packed_round_trips_through_from() {
        let c = ChunkCoord::new(-3, 12, -40_000);
        assert_eq!(ChunkCoord::from(c.packed()), c);
    }

    #[test]
    fn world_position_scales_origin() {
        let c = ChunkCoord::new(1, -2, 3);
        assert_eq!(c.world_position(16, 0.5), Vec3::new(8.0, -16.0, 24.0));
    }
}
