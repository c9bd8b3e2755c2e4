//! Scrape and health endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::ApiState;

/// GET /metrics — Prometheus text exposition of everything stored.
pub async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = pushgate_metrics::render_prometheus(&state.store.families_map(), &state.counters);
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// GET /-/healthy
pub async fn healthy() -> StatusCode {
    StatusCode::OK
}

/// GET /-/ready
pub async fn ready() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::test_state;

    #[tokio::test]
    async fn metrics_endpoint_returns_text() {
        let (state, store) = test_state(false);
        store.seed_group(&[("job", "a"), ("instance", "1")]);

        let resp = metrics(State(state)).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.contains("text/plain"));
    }

    #[tokio::test]
    async fn probes_are_ok() {
        assert_eq!(healthy().await, StatusCode::OK);
        assert_eq!(ready().await, StatusCode::OK);
    }
}
