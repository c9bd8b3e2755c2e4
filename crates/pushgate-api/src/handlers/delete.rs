//! Delete handlers.
//!
//! Translate HTTP delete requests into tombstone write requests against
//! the metric store. Deletion is asynchronous from the caller's point of
//! view: 202 means "accepted for processing", not "applied".

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use pushgate_store::types::WriteRequest;
use pushgate_store::{LabelSet, epoch_ms};

use super::{require_job, resolve_job};
use crate::ApiState;
use crate::params::parse_label_selector;

/// DELETE /metrics/job/{job}/{*labels}
///
/// Resolve the job name and the label selector, merge them into one label
/// set (the path-derived job wins over any `job` key in the selector),
/// and submit exactly one tombstone.
pub async fn delete_group(
    State(state): State<ApiState>,
    Path((job, selector)): Path<(String, String)>,
) -> Response {
    let job = match resolve_job(&state, &job) {
        Ok(job) => job,
        Err(resp) => return resp.into_response(),
    };
    let mut labels = match parse_label_selector(&selector) {
        Ok(labels) => labels,
        Err(e) => {
            debug!(selector = %selector, error = %e, "failed to parse label selector");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };
    if let Err(resp) = require_job(&job) {
        return resp.into_response();
    }

    labels.set_job(&job);
    debug!(labels = %labels, "submitting group delete");
    state.store.submit(WriteRequest::tombstone(labels, epoch_ms()));
    StatusCode::ACCEPTED.into_response()
}

/// DELETE /metrics/job/{job}
///
/// Resolve the job name, scan the current snapshot for every group
/// stored under it, and submit one tombstone per matching label set.
/// Zero matches still yields 202 — absent data is not an error.
///
/// The snapshot may be stale relative to concurrent pushes: groups
/// ingested for this job after the snapshot is taken survive this pass.
pub async fn delete_job(
    State(state): State<ApiState>,
    Path(job): Path<String>,
) -> Response {
    let job = match resolve_job(&state, &job) {
        Ok(job) => job,
        Err(resp) => return resp.into_response(),
    };
    if let Err(resp) = require_job(&job) {
        return resp.into_response();
    }

    let matches: Vec<LabelSet> = state
        .store
        .families_map()
        .into_values()
        .filter(|group| group.labels.job() == Some(job.as_str()))
        .map(|group| group.labels)
        .collect();

    debug!(%job, groups = matches.len(), "submitting job-wide delete");
    for labels in matches {
        state.store.submit(WriteRequest::tombstone(labels, epoch_ms()));
    }
    StatusCode::ACCEPTED.into_response()
}
