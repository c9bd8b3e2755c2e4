//! pushgate-api — HTTP surface for the pushgate metrics cache.
//!
//! Provides axum route handlers for pushing metric groups, deleting them
//! (per group or job-wide), scraping, and health probes. Every handler is
//! wrapped in an instrumentation adapter that counts invocations against
//! an injected sink.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | PUT | `/metrics/job/{job}[/{*labels}]` | Push, replacing the group |
//! | POST | `/metrics/job/{job}[/{*labels}]` | Push, merging per family |
//! | DELETE | `/metrics/job/{job}` | Delete every group of a job |
//! | DELETE | `/metrics/job/{job}/{*labels}` | Delete one group |
//! | * | `/metrics/job@base64/...` | Same, job name base64-encoded |
//! | GET | `/metrics` | Prometheus exposition |
//! | GET | `/-/healthy`, `/-/ready` | Probes |

pub mod handlers;
pub mod instrument;
pub mod params;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get};

use pushgate_metrics::HandlerCounters;
use pushgate_store::MetricStore;

use crate::instrument::Instrumented;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn MetricStore>,
    pub counters: HandlerCounters,
    /// Whether job path parameters on this router variant are
    /// base64-encoded.
    pub decode_job: bool,
}

/// Build the complete router: plain and base64 group routes, scrape, and
/// probes.
pub fn build_router(store: Arc<dyn MetricStore>, counters: HandlerCounters) -> Router {
    let plain = ApiState {
        store: store.clone(),
        counters: counters.clone(),
        decode_job: false,
    };
    let encoded = ApiState {
        decode_job: true,
        ..plain.clone()
    };

    Router::new()
        .nest("/metrics/job", group_routes(plain.clone()))
        .nest("/metrics/job@base64", group_routes(encoded))
        .route("/metrics", get(handlers::scrape::metrics).with_state(plain))
        .route("/-/healthy", get(handlers::scrape::healthy))
        .route("/-/ready", get(handlers::scrape::ready))
}

fn group_routes(state: ApiState) -> Router {
    let c = state.counters.clone();
    Router::new()
        .route(
            "/{job}",
            delete(Instrumented::new(c.delete_all.clone(), handlers::delete::delete_job))
                .put(Instrumented::new(c.push.clone(), handlers::push::push_replace))
                .post(Instrumented::new(c.push_add.clone(), handlers::push::push_merge)),
        )
        .route(
            "/{job}/{*labels}",
            delete(Instrumented::new(c.delete.clone(), handlers::delete::delete_group))
                .put(Instrumented::new(c.push.clone(), handlers::push::push_replace))
                .post(Instrumented::new(c.push_add.clone(), handlers::push::push_merge)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::{RecordingStore, labels};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn test_router() -> (Router, RecordingStore, HandlerCounters) {
        let store = RecordingStore::default();
        let counters = HandlerCounters::new();
        let router = build_router(Arc::new(store.clone()), counters.clone());
        (router, store, counters)
    }

    fn req(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn delete_group_route_resolves_selector() {
        let (router, store, counters) = test_router();

        // instance="1", quotes percent-encoded in the path.
        let resp = router
            .oneshot(req("DELETE", "/metrics/job/batch/instance=%221%22"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let submitted = store.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            submitted[0].labels,
            labels(&[("job", "batch"), ("instance", "1")])
        );
        assert_eq!(counters.delete.get(), 1);
        assert_eq!(counters.delete_all.get(), 0);
    }

    #[tokio::test]
    async fn delete_job_route_counts_delete_all() {
        let (router, store, counters) = test_router();
        store.seed_group(&[("job", "batch"), ("instance", "1")]);

        let resp = router
            .oneshot(req("DELETE", "/metrics/job/batch"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(store.submitted().len(), 1);
        assert_eq!(counters.delete_all.get(), 1);
        assert_eq!(counters.delete.get(), 0);
    }

    #[tokio::test]
    async fn base64_route_decodes_job() {
        let (router, store, _) = test_router();
        store.seed_group(&[("job", "foo"), ("instance", "1")]);

        // "Zm9v" → "foo"
        let resp = router
            .oneshot(req("DELETE", "/metrics/job@base64/Zm9v"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(store.submitted().len(), 1);
    }

    #[tokio::test]
    async fn plain_route_does_not_decode_job() {
        let (router, store, _) = test_router();
        store.seed_group(&[("job", "Zm9v"), ("instance", "1")]);

        let resp = router
            .oneshot(req("DELETE", "/metrics/job/Zm9v"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        // Matched the literal "Zm9v" job, not "foo".
        assert_eq!(store.submitted()[0].labels.job(), Some("Zm9v"));
    }

    #[tokio::test]
    async fn instrumented_counter_counts_failed_requests_too() {
        let (router, store, counters) = test_router();

        let resp = router
            .oneshot(req("DELETE", "/metrics/job@base64/not%2f%2fbase64"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(store.submitted().is_empty());
        // The adapter counts invocations, not successes.
        assert_eq!(counters.delete_all.get(), 1);
    }

    #[tokio::test]
    async fn push_route_reaches_store() {
        let (router, store, counters) = test_router();

        let request = Request::builder()
            .method("PUT")
            .uri("/metrics/job/batch/instance=%221%22")
            .body(Body::from("rows_total 5\n"))
            .unwrap();
        let resp = router.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(store.submitted().len(), 1);
        assert_eq!(counters.push.get(), 1);
    }

    #[tokio::test]
    async fn probes_respond() {
        let (router, _, _) = test_router();
        let resp = router.oneshot(req("GET", "/-/healthy")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
