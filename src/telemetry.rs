//! Metric names and recording for the persistence handlers.
//!
//! Metrics are emitted through the [`metrics`] facade. Install a recorder (prometheus, statsd, ...)
//! to collect them; without one every call is a no-op.
//!
//! Labels:
//!
//! - `service`: the gRPC service name, such as `persistd.item.v1.ItemPersistenceService`
//! - `operation`: the method, such as `create` or `list`
//! - `status`: `ok`, `error`, or `cancelled` when the call was dropped before it finished

use crate::tracing_shim::{info_span, Instrument as _};
use std::future::Future;
use std::time::Instant;

/// Total handled requests.
///
/// Labels: `service`, `operation`, `status`.
pub const REQUESTS_TOTAL: &str = "persistd_requests_total";

/// Handler duration in seconds.
///
/// Labels: `service`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "persistd_request_duration_seconds";

/// Run a handler body and record its outcome.
///
/// Exactly one counter increment and one duration sample are recorded per call, whether the body
/// succeeds, fails, or is dropped before completing (such as when the deadline expires or the
/// client goes away).
pub async fn observe<F, T, E>(
    service: &'static str,
    operation: &'static str,
    body: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let mut observation = Observation::start(service, operation);
    let result = body
        .instrument(info_span!("rpc", service, operation))
        .await;
    observation.status = if result.is_ok() { "ok" } else { "error" };
    result
}

/// One in-progress call. Its metrics are recorded when it is dropped.
struct Observation {
    /// The `service` label.
    service: &'static str,
    /// The `operation` label.
    operation: &'static str,
    /// When the call started.
    start: Instant,
    /// Stays `cancelled` unless the body ran to completion.
    status: &'static str,
}

impl Observation {
    fn start(service: &'static str, operation: &'static str) -> Self {
        Self {
            service,
            operation,
            start: Instant::now(),
            status: "cancelled",
        }
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        metrics::counter!(REQUESTS_TOTAL,
            "service" => self.service,
            "operation" => self.operation,
            "status" => self.status,
        )
        .increment(1);
        metrics::histogram!(REQUEST_DURATION_SECONDS,
            "service" => self.service,
            "operation" => self.operation,
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}
