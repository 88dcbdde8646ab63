//! Identifiers and simple allocators for batches and listener subscriptions.

use serde::{Deserialize, Serialize};

/// Identifies one `start` call for the lifetime of a view.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub u32);

/// Handle for a progress listener; removing it is the only way to silence the callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Subscription(pub u64);

/// Monotonic allocator for BatchId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_batch: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_batch(&mut self) -> BatchId {
        let id = BatchId(self.next_batch);
        self.next_batch = self.next_batch.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
