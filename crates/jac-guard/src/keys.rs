//! Unique-id sources for fallback artifact keys

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use ulid::Ulid;

/// Supplies the unique suffix of `fallback_{kind}_{id}` keys
pub trait FallbackKeySource: Send + Sync + fmt::Debug {
    /// Next unique id
    fn next_id(&self) -> String;

    /// Return to the initial state, if the source has one
    fn reset(&self) {}
}

/// Monotonic counter starting at 1
#[derive(Debug, Default)]
pub struct SequentialKeys {
    issued: AtomicU64,
}

impl SequentialKeys {
    /// Create counter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FallbackKeySource for SequentialKeys {
    fn next_id(&self) -> String {
        (self.issued.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }

    fn reset(&self) {
        self.issued.store(0, Ordering::Relaxed);
    }
}

/// ULIDs, unique across processes
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidKeys;

impl FallbackKeySource for UlidKeys {
    fn next_id(&self) -> String {
        Ulid::new().to_string()
    }
}
