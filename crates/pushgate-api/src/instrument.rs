//! Instrumentation adapter for route handlers.

use axum::extract::Request;
use axum::handler::Handler;

use pushgate_metrics::Counter;

/// Wraps a handler with an invocation counter: bump the counter, then
/// delegate unconditionally. Never inspects or alters the response.
#[derive(Clone)]
pub struct Instrumented<H> {
    counter: Counter,
    inner: H,
}

impl<H> Instrumented<H> {
    pub fn new(counter: Counter, inner: H) -> Self {
        Self { counter, inner }
    }
}

impl<H, T, S> Handler<T, S> for Instrumented<H>
where
    H: Handler<T, S>,
{
    type Future = H::Future;

    fn call(self, req: Request, state: S) -> Self::Future {
        self.counter.inc();
        self.inner.call(req, state)
    }
}
