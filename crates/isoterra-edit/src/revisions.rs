use hashbrown::HashMap;
use isoterra_chunk::ChunkCoord;

#[derive(Default, Debug, Clone, Copy)]
pub struct EditStats {
    pub rev_entries: usize,
    pub built_entries: usize,
    pub dirty: usize,
}

/// Per-chunk change tracking: edits bump a stamp, finished meshes record
/// the stamp they were built from.
#[derive(Default, Debug)]
pub struct EditRevisions {
    rev: HashMap<ChunkCoord, u64>,
    built: HashMap<ChunkCoord, u64>,
    counter: u64,
}

impl EditRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every chunk in `coords` changed. Returns the new stamp.
    pub fn bump<I: IntoIterator<Item = ChunkCoord>>(&mut self, coords: I) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        let stamp = self.counter;
        for c in coords {
            self.rev.insert(c, stamp);
        }
        stamp
    }

    pub fn get_rev(&self, coord: ChunkCoord) -> u64 {
        self.rev.get(&coord).copied().unwrap_or(0)
    }

    pub fn get_built_rev(&self, coord: ChunkCoord) -> u64 {
        self.built.get(&coord).copied().unwrap_or(0)
    }

    pub fn mark_built(&mut self, coord: ChunkCoord, rev: u64) {
        // only move forward
        let e = self.built.entry(coord).or_insert(0);
        if rev > *e {
            *e = rev;
        }
    }

    pub fn needs_rebuild(&self, coord: ChunkCoord) -> bool {
        self.get_rev(coord) > self.get_built_rev(coord)
    }

    /// Chunks with edits newer than their last mesh, sorted.
    pub fn dirty(&self) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = self
            .rev
            .keys()
            .copied()
            .filter(|c| self.needs_rebuild(*c))
            .collect();
        out.sort_unstable();
        out
    }

    /// Drops tracking for a disposed chunk.
    pub fn forget(&mut self, coord: ChunkCoord) {
        self.rev.remove(&coord);
        self.built.remove(&coord);
    }

    pub fn stats(&self) -> EditStats {
        EditStats {
            rev_entries: self.rev.len(),
            built_entries: self.built.len(),
            dirty: self.rev.keys().filter(|c| self.needs_rebuild(**c)).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_then_build_clears_dirty() {
        let mut r = EditRevisions::new();
        let a = ChunkCoord::new(0, 0, 0);
        let b = ChunkCoord::new(-1, 0, 0);
        let s1 = r.bump([a, b]);
        assert_eq!(r.dirty(), vec![b, a]);
        r.mark_built(a, s1);
        assert!(!r.needs_rebuild(a));
        assert!(r.needs_rebuild(b));
        let s2 = r.bump([a]);
        assert!(s2 > s1);
        assert!(r.needs_rebuild(a));
        // stale build does not regress
        r.mark_built(a, s2);
        r.mark_built(a, s1);
        assert_eq!(r.get_built_rev(a), s2);
        assert_eq!(r.stats().dirty, 1);
        r.forget(b);
        assert!(r.dirty().is_empty());
    }
}
