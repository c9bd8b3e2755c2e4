//! Push handlers.
//!
//! Accept a text-exposition body for a metric group. PUT replaces the
//! whole group; POST merges per family name. Both share the delete
//! handlers' job/selector validation gates, and both are asynchronous:
//! 202 means the write request was queued, not applied.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use pushgate_store::expfmt;
use pushgate_store::types::WriteRequest;
use pushgate_store::epoch_ms;

use super::{require_job, resolve_job};
use crate::ApiState;
use crate::params::parse_label_selector;

/// Path parameters for the push routes. The label selector is absent on
/// the bare `/{job}` route.
#[derive(Debug, Deserialize)]
pub struct GroupPath {
    pub job: String,
    #[serde(default)]
    pub labels: Option<String>,
}

/// PUT /metrics/job/{job}[/{*labels}] — replace the group.
pub async fn push_replace(
    State(state): State<ApiState>,
    Path(path): Path<GroupPath>,
    body: String,
) -> Response {
    handle_push(state, path, body, true).await
}

/// POST /metrics/job/{job}[/{*labels}] — merge into the group.
pub async fn push_merge(
    State(state): State<ApiState>,
    Path(path): Path<GroupPath>,
    body: String,
) -> Response {
    handle_push(state, path, body, false).await
}

async fn handle_push(state: ApiState, path: GroupPath, body: String, replace: bool) -> Response {
    let job = match resolve_job(&state, &path.job) {
        Ok(job) => job,
        Err(resp) => return resp.into_response(),
    };
    let selector = path.labels.unwrap_or_default();
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
    let families = match expfmt::parse_exposition(&body) {
        Ok(families) => families,
        Err(e) => {
            debug!(error = %e, "failed to parse pushed body");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    labels.set_job(&job);
    debug!(labels = %labels, families = families.len(), replace, "submitting push");
    state
        .store
        .submit(WriteRequest::push(labels, epoch_ms(), families, replace));
    StatusCode::ACCEPTED.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::test_state;

    fn path(job: &str, labels: Option<&str>) -> Path<GroupPath> {
        Path(GroupPath {
            job: job.to_string(),
            labels: labels.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn push_submits_parsed_families() {
        let (state, store) = test_state(false);
        let body = "rows_total{table=\"users\"} 10\njob_duration_seconds 3.5\n".to_string();

        let resp = push_replace(State(state), path("batch", Some(r#"instance="1""#)), body).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let submitted = store.submitted();
        assert_eq!(submitted.len(), 1);
        let req = &submitted[0];
        assert!(req.replace);
        assert_eq!(req.labels.job(), Some("batch"));
        assert_eq!(req.labels.get("instance"), Some("1"));
        assert_eq!(req.families.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn push_without_selector_uses_job_only() {
        let (state, store) = test_state(false);
        let resp = push_merge(State(state), path("batch", None), "m 1\n".to_string()).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let req = &store.submitted()[0];
        assert!(!req.replace);
        assert_eq!(req.labels.len(), 1);
        assert_eq!(req.labels.job(), Some("batch"));
    }

    #[tokio::test]
    async fn push_rejects_malformed_body() {
        let (state, store) = test_state(false);
        let resp = push_replace(
            State(state),
            path("batch", None),
            "broken{ 1\n".to_string(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(store.submitted().is_empty());
    }

    #[tokio::test]
    async fn push_rejects_empty_job() {
        let (state, store) = test_state(false);
        let resp = push_replace(State(state), path("", None), "m 1\n".to_string()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(store.submitted().is_empty());
    }

    #[tokio::test]
    async fn push_rejects_bad_selector_before_parsing_body() {
        let (state, store) = test_state(false);
        // The body is also malformed; the selector error must win and
        // nothing may be submitted.
        let resp = push_replace(
            State(state),
            path("batch", Some("nope")),
            "broken{ 1\n".to_string(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(store.submitted().is_empty());
    }

    #[tokio::test]
    async fn push_empty_body_submits_empty_replace() {
        // An empty PUT body still replaces the group with zero families.
        let (state, store) = test_state(false);
        let resp = push_replace(State(state), path("batch", None), String::new()).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let req = &store.submitted()[0];
        assert_eq!(req.families.as_ref().unwrap().len(), 0);
        assert!(!req.is_tombstone());
    }
}
