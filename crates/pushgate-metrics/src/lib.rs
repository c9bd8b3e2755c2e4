//! pushgate-metrics — observability for the pushgate HTTP surface.
//!
//! Provides injected per-handler invocation counters (no global registry;
//! every router instance gets its own sink) and the Prometheus text
//! exposition of stored metric groups for the scrape endpoint.

pub mod counters;
pub mod exposition;

pub use counters::{Counter, HandlerCounters};
pub use exposition::render_prometheus;
