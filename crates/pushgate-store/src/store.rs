//! Metric store — bounded write-request queue plus grouped sample storage.
//!
//! The store hands out two narrow operations: a non-blocking `submit` and
//! a point-in-time `families_map` snapshot. All mutation happens on a
//! single apply loop draining the queue, so submitters never contend on
//! the group map and never wait for a write to land.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::types::{MetricGroup, WriteRequest};

/// The store surface consumed by the HTTP layer.
pub trait MetricStore: Send + Sync {
    /// Enqueue a write request. Fire-and-forget: nothing is awaited, no
    /// acknowledgment is observed by the caller.
    fn submit(&self, req: WriteRequest);

    /// Point-in-time snapshot of all stored groups, keyed by the
    /// canonical label fingerprint. May be stale relative to requests
    /// still sitting in the queue.
    fn families_map(&self) -> HashMap<String, MetricGroup>;
}

type Groups = Arc<RwLock<HashMap<String, MetricGroup>>>;

/// In-memory metric store. `Clone` + `Send` + `Sync`; the clones share
/// one queue and one group map.
#[derive(Clone)]
pub struct InMemoryStore {
    tx: mpsc::Sender<WriteRequest>,
    groups: Groups,
}

impl InMemoryStore {
    /// Create a store with a bounded write queue, returning the store
    /// handle and the apply loop that drains the queue.
    pub fn new(queue_capacity: usize) -> (Self, ApplyLoop) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let groups: Groups = Arc::new(RwLock::new(HashMap::new()));
        let store = Self {
            tx,
            groups: groups.clone(),
        };
        (store, ApplyLoop { rx, groups })
    }
}

impl MetricStore for InMemoryStore {
    fn submit(&self, req: WriteRequest) {
        match self.tx.try_send(req) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(req)) => {
                warn!(labels = %req.labels, "write queue full, dropping request");
            }
            Err(mpsc::error::TrySendError::Closed(req)) => {
                warn!(labels = %req.labels, "write queue closed, dropping request");
            }
        }
    }

    fn families_map(&self) -> HashMap<String, MetricGroup> {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Owns the receiving end of the write queue and the right to mutate the
/// group map.
pub struct ApplyLoop {
    rx: mpsc::Receiver<WriteRequest>,
    groups: Groups,
}

impl ApplyLoop {
    /// Apply one write request to the group map.
    ///
    /// Tombstones remove the group with exactly the request's labels.
    /// Pushes either replace the group's families wholesale or merge per
    /// family name, and refresh the push timestamp either way.
    pub fn apply(&self, req: WriteRequest) {
        let key = req.labels.group_key();
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        match req.families {
            None => {
                let existed = groups.remove(&key).is_some();
                debug!(labels = %req.labels, existed, "tombstone applied");
            }
            Some(families) => {
                let group = groups.entry(key).or_insert_with(|| MetricGroup {
                    labels: req.labels.clone(),
                    families: BTreeMap::new(),
                    pushed_at_ms: req.timestamp_ms,
                });
                if req.replace {
                    group.families.clear();
                }
                for family in families {
                    group.families.insert(family.name.clone(), family);
                }
                group.pushed_at_ms = req.timestamp_ms;
                debug!(
                    labels = %req.labels,
                    families = group.families.len(),
                    "push applied"
                );
            }
        }
    }

    /// Drain the queue until the shutdown signal fires, then apply
    /// whatever is still buffered before returning.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("metric store apply loop started");
        loop {
            tokio::select! {
                maybe = self.rx.recv() => match maybe {
                    Some(req) => self.apply(req),
                    None => break,
                },
                _ = shutdown.changed() => {
                    while let Ok(req) = self.rx.try_recv() {
                        self.apply(req);
                    }
                    break;
                }
            }
        }
        info!("metric store apply loop stopped");
    }
}
