//! Domain types for the pushgate metric store.
//!
//! A [`LabelSet`] identifies exactly one metric group; a [`WriteRequest`]
//! carries either a pushed payload or — when the payload is absent — a
//! tombstone that the store interprets as deletion of that group.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{StoreError, StoreResult};

/// The label every stored group is scoped by.
pub const JOB_LABEL: &str = "job";

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// True if `name` is a valid Prometheus label name
/// (`[a-zA-Z_][a-zA-Z0-9_]*`).
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape a label value for the text exposition format.
pub fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

// ── Label set ──────────────────────────────────────────────────────

/// A mapping from label name to label value. Keys are unique, ordering is
/// irrelevant (a `BTreeMap` keeps the canonical fingerprint stable).
///
/// Label names are validated at insertion, so a constructed `LabelSet` can
/// only hold well-formed names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set from name/value pairs, validating every name.
    pub fn try_from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> StoreResult<Self> {
        let mut labels = Self::new();
        for (name, value) in pairs {
            labels.insert(name, value)?;
        }
        Ok(labels)
    }

    /// Insert a pair, replacing any existing value for the same name.
    pub fn insert(&mut self, name: &str, value: &str) -> StoreResult<()> {
        if !is_valid_label_name(name) {
            return Err(StoreError::InvalidLabelName(name.to_string()));
        }
        self.0.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The `job` label value, if present.
    pub fn job(&self) -> Option<&str> {
        self.get(JOB_LABEL)
    }

    /// Set the `job` label, overwriting any existing value. The
    /// path-derived job always wins over a selector-provided one.
    pub fn set_job(&mut self, job: &str) {
        self.0.insert(JOB_LABEL.to_string(), job.to_string());
    }

    /// A copy of this set with every pair from `other` overriding it.
    /// Used when grouping labels take precedence over sample labels.
    pub fn merged_over(&self, other: &LabelSet) -> LabelSet {
        let mut merged = self.clone();
        for (name, value) in &other.0 {
            merged.0.insert(name.clone(), value.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical fingerprint of this set, used as the group key. Equal
    /// label sets always render the same key (keys are sorted).
    pub fn group_key(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_label_value(value));
            out.push('"');
        }
        out
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.group_key())
    }
}

// ── Pushed payload ─────────────────────────────────────────────────

/// One sample within a family: extra labels (beyond the grouping labels)
/// plus a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub labels: LabelSet,
    pub value: f64,
}

/// A named metric family with its pushed samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFamily {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            samples: Vec::new(),
        }
    }
}

// ── Write request ──────────────────────────────────────────────────

/// A mutation submitted to the store.
///
/// `families == None` is the tombstone signal: the store removes the group
/// identified by `labels` as of `timestamp_ms`. No acknowledgment flows
/// back to the submitter.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub labels: LabelSet,
    pub timestamp_ms: u64,
    pub families: Option<Vec<MetricFamily>>,
    /// When pushing: replace the whole group (`true`) or merge per family
    /// name (`false`). Ignored for tombstones.
    pub replace: bool,
}

impl WriteRequest {
    /// A deletion marker for the group with exactly these labels.
    pub fn tombstone(labels: LabelSet, timestamp_ms: u64) -> Self {
        Self {
            labels,
            timestamp_ms,
            families: None,
            replace: false,
        }
    }

    /// A pushed payload for the group with these labels.
    pub fn push(
        labels: LabelSet,
        timestamp_ms: u64,
        families: Vec<MetricFamily>,
        replace: bool,
    ) -> Self {
        Self {
            labels,
            timestamp_ms,
            families: Some(families),
            replace,
        }
    }

    /// True if this request deletes rather than ingests.
    pub fn is_tombstone(&self) -> bool {
        self.families.is_none()
    }
}

// ── Stored group ───────────────────────────────────────────────────

/// A stored metric group: the grouping labels, the families pushed under
/// them, and the time of the last push. Snapshot readers treat this as
/// immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricGroup {
    pub labels: LabelSet,
    /// Families keyed by family name.
    pub families: BTreeMap<String, MetricFamily>,
    pub pushed_at_ms: u64,
}
