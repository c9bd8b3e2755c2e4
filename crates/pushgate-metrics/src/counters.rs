//! Handler invocation counters.
//!
//! Counters are plain shared atomics handed to the router at build time,
//! so independent router instances stay independently testable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter. Cloning yields a handle to the
/// same underlying value.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicU64>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// One counter per HTTP handler, incremented once per invocation.
#[derive(Debug, Clone, Default)]
pub struct HandlerCounters {
    pub push: Counter,
    pub push_add: Counter,
    pub delete: Counter,
    pub delete_all: Counter,
}

impl HandlerCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name/counter pairs in stable order, for exposition.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Counter)> {
        [
            ("delete", &self.delete),
            ("delete_all", &self.delete_all),
            ("push", &self.push),
            ("push_add", &self.push_add),
        ]
        .into_iter()
    }
}
