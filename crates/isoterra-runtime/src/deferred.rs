use std::collections::VecDeque;

/// Work postponed to the host's next fixed (physics) step.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T: PartialEq> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `item` unless it is already waiting.
    pub fn push(&mut self, item: T) {
        if !self.items.contains(&item) {
            self.items.push_back(item);
        }
    }

    pub fn remove(&mut self, item: &T) {
        self.items.retain(|i| i != item);
    }

    /// Takes everything queued so far, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.drain(..)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
