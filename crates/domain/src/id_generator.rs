use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::item::ItemId;

/// Source of fresh item ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ItemId;
}

/// Millisecond-timestamp ids that never repeat within the process.
///
/// Each id is `max(now_millis, previous + 1)`, so ids stay roughly
/// time-ordered while rapid creates within the same millisecond still get
/// distinct values.
#[derive(Debug, Default)]
pub struct MonotonicIdGenerator {
    last: AtomicI64,
}

impl MonotonicIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start above `floor`, e.g. the largest id already persisted.
    pub fn starting_after(floor: ItemId) -> Self {
        Self {
            last: AtomicI64::new(floor.value()),
        }
    }
}

impl IdGenerator for MonotonicIdGenerator {
    fn next_id(&self) -> ItemId {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev.saturating_add(1));
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return ItemId::new(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}
