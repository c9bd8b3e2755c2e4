//! Prometheus text exposition format.
//!
//! Renders the stored metric groups plus the handler counters into the
//! text format served on the scrape endpoint.

use std::collections::{BTreeMap, HashMap};

use pushgate_store::types::MetricGroup;
use pushgate_store::LabelSet;

use crate::counters::HandlerCounters;

fn fmt_labels(labels: &LabelSet) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", labels.group_key())
    }
}

/// Render all stored groups and handler counters into text exposition.
///
/// Sample labels are merged with the owning group's labels; grouping
/// labels win on conflict. Output ordering is deterministic.
pub fn render_prometheus(
    families_map: &HashMap<String, MetricGroup>,
    counters: &HandlerCounters,
) -> String {
    let mut groups: Vec<&MetricGroup> = families_map.values().collect();
    groups.sort_by_key(|g| g.labels.group_key());

    // Collect samples per family name so each TYPE line appears once.
    let mut by_family: BTreeMap<&str, Vec<(LabelSet, f64)>> = BTreeMap::new();
    for group in &groups {
        for family in group.families.values() {
            for sample in &family.samples {
                let labels = sample.labels.merged_over(&group.labels);
                by_family
                    .entry(family.name.as_str())
                    .or_default()
                    .push((labels, sample.value));
            }
        }
    }

    let mut out = String::new();
    for (name, samples) in &by_family {
        out.push_str(&format!("# TYPE {name} untyped\n"));
        for (labels, value) in samples {
            out.push_str(&format!("{name}{} {value}\n", fmt_labels(labels)));
        }
    }

    out.push_str("# HELP pushgate_push_time_seconds Last push time for this group.\n");
    out.push_str("# TYPE pushgate_push_time_seconds gauge\n");
    for group in &groups {
        out.push_str(&format!(
            "pushgate_push_time_seconds{} {:.3}\n",
            fmt_labels(&group.labels),
            group.pushed_at_ms as f64 / 1000.0
        ));
    }

    out.push_str("# HELP pushgate_http_requests_total HTTP requests by handler.\n");
    out.push_str("# TYPE pushgate_http_requests_total counter\n");
    for (handler, counter) in counters.iter() {
        out.push_str(&format!(
            "pushgate_http_requests_total{{handler=\"{handler}\"}} {}\n",
            counter.get()
        ));
    }

    out
}
