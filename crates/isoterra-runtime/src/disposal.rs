use std::collections::VecDeque;

use isoterra_chunk::ChunkCoord;

/// Rate-limited chunk removal: at most `batch` chunks per tick, with
/// `delay_ticks` idle ticks between batches to spread the cost.
#[derive(Debug)]
pub struct DisposalQueue {
    pending: VecDeque<ChunkCoord>,
    batch: usize,
    delay_ticks: u32,
    cooldown: u32,
}

impl DisposalQueue {
    pub fn new(batch: usize, delay_ticks: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            batch: batch.max(1),
            delay_ticks,
            cooldown: 0,
        }
    }

    pub fn push<I: IntoIterator<Item = ChunkCoord>>(&mut self, coords: I) {
        for c in coords {
            if !self.pending.contains(&c) {
                self.pending.push_back(c);
            }
        }
    }

    /// Advances one tick and returns the chunks due for removal now.
    pub fn tick(&mut self) -> Vec<ChunkCoord> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return Vec::new();
        }
        let take = self.batch.min(self.pending.len());
        self.cooldown = self.delay_ticks;
        self.pending.drain(..take).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32) -> ChunkCoord {
        ChunkCoord::new(x, 0, 0)
    }

    #[test]
    fn batches_are_spaced_by_delay() {
        let mut q = DisposalQueue::new(2, 1);
        q.push([c(0), c(1), c(2), c(1), c(3), c(4)]);
        assert_eq!(q.len(), 5);
        assert_eq!(q.tick(), vec![c(0), c(1)]);
        assert!(q.tick().is_empty());
        assert_eq!(q.tick(), vec![c(2), c(3)]);
        assert!(q.tick().is_empty());
        assert_eq!(q.tick(), vec![c(4)]);
        assert!(q.is_empty());
        assert!(q.tick().is_empty());
    }

    #[test]
    fn zero_delay_drains_every_tick() {
        let mut q = DisposalQueue::new(1, 0);
        q.push([c(0), c(1)]);
        assert_eq!(q.tick(), vec![c(0)]);
        assert_eq!(q.tick(), vec![c(1)]);
    }
}
