//! pushgate-store — in-memory metric cache for pushed batch-job metrics.
//!
//! Pushed samples are grouped by their full label set (which always carries
//! a `job` label). Writers never touch the group map directly: every
//! mutation travels as a [`WriteRequest`] through a bounded queue drained
//! by a single apply loop, so HTTP handlers stay fire-and-forget.
//!
//! # Architecture
//!
//! ```text
//! InMemoryStore
//!   ├── submit(WriteRequest)  ← non-blocking enqueue (push or tombstone)
//!   └── families_map()        ← point-in-time snapshot of all groups
//!
//! ApplyLoop
//!   └── run(shutdown)         ← drains the queue, mutates the group map
//! ```

pub mod error;
pub mod expfmt;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use store::{ApplyLoop, InMemoryStore, MetricStore};
pub use types::{LabelSet, MetricFamily, MetricGroup, Sample, WriteRequest, epoch_ms};
