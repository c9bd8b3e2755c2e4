//! HTTP route handlers.
//!
//! Every handler validates its path parameters fully before touching the
//! store: either validation fails and zero write requests are submitted,
//! or it succeeds and all resolved writes are submitted.

pub mod delete;
pub mod push;
pub mod scrape;

use axum::http::StatusCode;
use tracing::debug;

use crate::ApiState;
use crate::params::decode_job_name;

/// Resolve the job path parameter, decoding it when this router variant
/// carries base64-encoded job names.
pub(crate) fn resolve_job(state: &ApiState, raw: &str) -> Result<String, (StatusCode, String)> {
    if !state.decode_job {
        return Ok(raw.to_string());
    }
    decode_job_name(raw).map_err(|e| {
        debug!(job = raw, error = %e, "invalid base64 encoding in job name");
        (
            StatusCode::BAD_REQUEST,
            format!("invalid base64 encoding in job name {raw:?}: {e}"),
        )
    })
}

/// Reject an empty resolved job before anything reaches the store.
pub(crate) fn require_job(job: &str) -> Result<(), (StatusCode, String)> {
    if job.is_empty() {
        debug!("job name is required");
        return Err((StatusCode::BAD_REQUEST, "job name is required".to_string()));
    }
    Ok(())
}
