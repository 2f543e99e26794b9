use hashbrown::HashMap;
use isoterra_geom::LatticePos;
use isoterra_world::hash;
use isoterra_world::{ChunkCoord, PackedCoord};
use thiserror::Error;

use crate::chunk::Chunk;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("hash collision: chunk {0:?} is already registered")]
    Duplicate(ChunkCoord),
    #[error("chunk {0:?} lies outside the packable coordinate range")]
    OutOfRange(ChunkCoord),
}

/// Resident chunks keyed by packed coordinate.
pub struct ChunkRegistry {
    cubes_per_axis: usize,
    chunks: HashMap<PackedCoord, Chunk>,
}

/// `ceil(a / n)` for positive `n`.
#[inline]
fn div_ceil(a: i32, n: i32) -> i32 {
    -((-a).div_euclid(n))
}

impl ChunkRegistry {
    pub fn new(cubes_per_axis: usize) -> Self {
        debug_assert!(cubes_per_axis > 0);
        Self {
            cubes_per_axis,
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn cubes_per_axis(&self) -> usize {
        self.cubes_per_axis
    }

    /// Registers `chunk` under its own coordinate. Never overwrites.
    pub fn add(&mut self, chunk: Chunk) -> Result<(), RegistryError> {
        let c = chunk.coord;
        let key = hash::try_pack(c.cx, c.cy, c.cz).ok_or(RegistryError::OutOfRange(c))?;
        match self.chunks.entry(PackedCoord(key)) {
            hashbrown::hash_map::Entry::Occupied(_) => Err(RegistryError::Duplicate(c)),
            hashbrown::hash_map::Entry::Vacant(v) => {
                v.insert(chunk);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        let key = Self::key(coord)?;
        self.chunks.remove(&key)
    }

    #[inline]
    pub fn try_get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&Self::key(coord)?)
    }

    /// Direct handle for in-place edits; valid for the duration of the borrow.
    #[inline]
    pub fn try_get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&Self::key(coord)?)
    }

    #[inline]
    pub fn exists(&self, coord: ChunkCoord) -> bool {
        Self::key(coord).is_some_and(|k| self.chunks.contains_key(&k))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.values().map(|c| c.coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    #[inline]
    fn key(coord: ChunkCoord) -> Option<PackedCoord> {
        hash::try_pack(coord.cx, coord.cy, coord.cz).map(PackedCoord)
    }

    /// Inclusive chunk-coordinate range whose footprints `[c*n, c*n + n]`
    /// intersect the inclusive lattice box `[min, max]`.
    pub fn chunk_range(&self, min: LatticePos, max: LatticePos) -> (ChunkCoord, ChunkCoord) {
        let n = self.cubes_per_axis as i32;
        let lo = |v: i32| div_ceil(v, n) - 1;
        let hi = |v: i32| v.div_euclid(n);
        (
            ChunkCoord::new(lo(min.x), lo(min.y), lo(min.z)),
            ChunkCoord::new(hi(max.x), hi(max.y), hi(max.z)),
        )
    }

    /// Coordinates of every resident chunk touching the lattice box, sorted.
    pub fn coords_in_region(&self, min: LatticePos, max: LatticePos) -> Vec<ChunkCoord> {
        let (lo, hi) = self.chunk_range(min, max);
        if lo.cx > hi.cx || lo.cy > hi.cy || lo.cz > hi.cz {
            return Vec::new();
        }
        let span = |a: i32, b: i32| (i64::from(b) - i64::from(a) + 1) as u64;
        let volume = span(lo.cx, hi.cx)
            .saturating_mul(span(lo.cy, hi.cy))
            .saturating_mul(span(lo.cz, hi.cz));
        let mut out: Vec<ChunkCoord> = if volume <= self.chunks.len() as u64 {
            let mut v = Vec::new();
            for cz in lo.cz..=hi.cz {
                for cy in lo.cy..=hi.cy {
                    for cx in lo.cx..=hi.cx {
                        let c = ChunkCoord::new(cx, cy, cz);
                        if self.exists(c) {
                            v.push(c);
                        }
                    }
                }
            }
            v
        } else {
            self.coords()
                .filter(|c| {
                    (lo.cx..=hi.cx).contains(&c.cx)
                        && (lo.cy..=hi.cy).contains(&c.cy)
                        && (lo.cz..=hi.cz).contains(&c.cz)
                })
                .collect()
        };
        out.sort_unstable();
        out
    }

    /// Visits every resident chunk whose footprint intersects `[min, max]`.
    pub fn for_each_in_region<F: FnMut(&Chunk)>(&self, min: LatticePos, max: LatticePos, mut f: F) {
        for c in self.coords_in_region(min, max) {
            if let Some(chunk) = self.try_get(c) {
                f(chunk);
            }
        }
    }

    /// Mutable variant of [`Self::for_each_in_region`]; chunks are visited one at a time.
    pub fn for_each_in_region_mut<F: FnMut(&mut Chunk)>(
        &mut self,
        min: LatticePos,
        max: LatticePos,
        mut f: F,
    ) {
        for c in self.coords_in_region(min, max) {
            if let Some(chunk) = self.try_get_mut(c) {
                f(chunk);
            }
        }
    }
}
