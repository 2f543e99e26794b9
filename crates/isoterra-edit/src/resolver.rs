//! Maps one lattice point to every chunk-local copy of it.
//!
//! Chunks store `n + 1` samples per axis, so a point on a chunk face, edge,
//! or corner lives in 2, 4, or 8 chunks. Writers must update all copies to
//! keep border planes numerically identical.

use isoterra_chunk::{ChunkCoord, ChunkRegistry, Voxel};
use isoterra_geom::LatticePos;

/// Up to eight `(chunk, local)` copies of one lattice point, stored inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffectedSet {
    len: u8,
    items: [(ChunkCoord, LatticePos); 8],
}

impl Default for AffectedSet {
    fn default() -> Self {
        Self {
            len: 0,
            items: [(ChunkCoord::default(), LatticePos::ZERO); 8],
        }
    }
}

impl AffectedSet {
    fn push_unique(&mut self, item: (ChunkCoord, LatticePos)) {
        if self.as_slice().contains(&item) {
            return;
        }
        debug_assert!((self.len as usize) < self.items.len());
        self.items[self.len as usize] = item;
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[(ChunkCoord, LatticePos)] {
        &self.items[..self.len as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, LatticePos)> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.iter().map(|(c, _)| c)
    }

    /// Writes `f` into every resident copy. Chunks that are absent or still
    /// waiting for data are skipped. Returns how many copies were written.
    pub fn apply_to_registry<F: FnMut(&mut Voxel)>(
        &self,
        registry: &mut ChunkRegistry,
        mut f: F,
    ) -> usize {
        let mut written = 0;
        for (coord, local) in self.iter() {
            let Some(chunk) = registry.try_get_mut(coord) else {
                continue;
            };
            if !chunk.has_data() {
                continue;
            }
            let grid = chunk.grid_mut();
            if let Some(mut v) = grid.get_local(local) {
                f(&mut v);
                grid.set_local(local, v);
                written += 1;
            }
        }
        written
    }
}

/// Resolves `local` (in `[0, n]^3`) of `chunk` to all chunks holding a copy.
pub fn resolve(chunk: ChunkCoord, local: LatticePos, n: usize) -> AffectedSet {
    let n = n as i32;
    debug_assert!(n > 0);
    debug_assert!((0..3).all(|a| (0..=n).contains(&local.axis(a))));

    let mut axes = [(0usize, 0i32); 3];
    let mut k = 0;
    for a in 0..3 {
        let v = local.axis(a);
        let mask = if v == n {
            1
        } else if v == 0 {
            -1
        } else {
            0
        };
        if mask != 0 {
            axes[k] = (a, mask);
            k += 1;
        }
    }

    let mut out = AffectedSet::default();
    for combo in 0..(1u32 << k) {
        let mut c = chunk;
        let mut l = local;
        for (bit, &(a, mask)) in axes[..k].iter().enumerate() {
            if combo & (1 << bit) != 0 {
                c = c.with_axis(a, c.axis(a) + mask);
                l = l.with_axis(a, if mask > 0 { 0 } else { n });
            }
        }
        out.push_unique((c, l));
    }
    out
}

/// Same as [`resolve`] for a global lattice point.
pub fn resolve_global(p: LatticePos, n: usize) -> AffectedSet {
    let chunk = ChunkCoord::containing(p, n);
    let ni = n as i32;
    let local = LatticePos::new(p.x.rem_euclid(ni), p.y.rem_euclid(ni), p.z.rem_euclid(ni));
    resolve(chunk, local, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_point_resolves_to_two_chunks() {
        let set = resolve(ChunkCoord::new(0, 0, 0), LatticePos::new(0, 5, 5), 16);
        assert_eq!(
            set.as_slice(),
            &[
                (ChunkCoord::new(0, 0, 0), LatticePos::new(0, 5, 5)),
                (ChunkCoord::new(-1, 0, 0), LatticePos::new(16, 5, 5)),
            ]
        );
    }

    #[test]
    fn counts_by_position_class() {
        let c = ChunkCoord::new(2, -3, 7);
        assert_eq!(resolve(c, LatticePos::new(3, 4, 5), 8).len(), 1);
        assert_eq!(resolve(c, LatticePos::new(8, 4, 5), 8).len(), 2);
        assert_eq!(resolve(c, LatticePos::new(8, 0, 5), 8).len(), 4);
        assert_eq!(resolve(c, LatticePos::new(0, 8, 0), 8).len(), 8);
    }

    #[test]
    fn upper_corner_maps_to_positive_neighbours() {
        let set = resolve(ChunkCoord::default(), LatticePos::splat(4), 4);
        assert!(set.iter().any(|e| e == (ChunkCoord::new(1, 1, 1), LatticePos::ZERO)));
        assert!(set.iter().any(|e| e == (ChunkCoord::default(), LatticePos::splat(4))));
    }

    #[test]
    fn global_resolution_handles_negatives() {
        let set = resolve_global(LatticePos::new(-16, 3, 3), 16);
        let mut chunks: Vec<ChunkCoord> = set.chunks().collect();
        chunks.sort_unstable();
        assert_eq!(chunks, vec![ChunkCoord::new(-2, 0, 0), ChunkCoord::new(-1, 0, 0)]);
        let set = resolve_global(LatticePos::new(-1, 3, 3), 16);
        assert_eq!(set.as_slice(), &[(ChunkCoord::new(-1, 0, 0), LatticePos::new(15, 3, 3))]);
    }

    #[test]
    fn every_copy_names_the_same_global_point() {
        let n = 6;
        let p = LatticePos::new(12, -6, 7);
        for (c, l) in resolve_global(p, n).iter() {
            assert_eq!(c.origin(n) + l, p);
        }
    }

    #[test]
    fn writer_skips_chunks_without_data() {
        use isoterra_chunk::{Chunk, VoxelGrid};

        let mut reg = ChunkRegistry::new(4);
        let filled = VoxelGrid::filled(5, Voxel::new(-1.0, 2));
        reg.add(Chunk::with_grid(ChunkCoord::new(0, 0, 0), filled)).unwrap();
        reg.add(Chunk::new_empty(ChunkCoord::new(1, 0, 0), 5)).unwrap();
        let set = resolve_global(LatticePos::new(4, 1, 1), 4);
        assert_eq!(set.len(), 2);
        let written = set.apply_to_registry(&mut reg, |v| v.density = 0.25);
        assert_eq!(written, 1);
        let empty = reg.try_get(ChunkCoord::new(1, 0, 0)).unwrap();
        assert_eq!(empty.grid().get(0, 1, 1), Voxel::EMPTY);
        let real = reg.try_get(ChunkCoord::new(0, 0, 0)).unwrap();
        assert_eq!(real.grid().get(4, 1, 1), Voxel::new(0.25, 2));
    }
}
