use std::collections::VecDeque;

use crate::core::collidable::EntityHandle;

/// FIFO of entities waiting to be registered on the next flush.
#[derive(Default)]
pub struct DelayedAddQueue {
    queue: VecDeque<EntityHandle>,
}

impl DelayedAddQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: EntityHandle) {
        self.queue.push_back(entity);
    }

    /// Empties the queue and hands back everything it held, oldest first.
    pub fn take_all(&mut self) -> VecDeque<EntityHandle> {
        std::mem::take(&mut self.queue)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
