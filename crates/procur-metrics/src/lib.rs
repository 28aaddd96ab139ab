//! Prometheus metrics for the procurement negotiation engine (§4.P).
//!
//! Purely additive instrumentation: collectors in [`metrics`] register into
//! the global default registry, and [`collector::MetricsCollector`] wraps
//! them behind typed `record_*` calls. Exposition transport (an HTTP
//! endpoint, a push gateway, whatever the host prefers) is not this crate's
//! concern; [`collector::MetricsCollector::gather_text`] hands back the
//! rendered text format for the host to serve however it likes.

mod collector;
mod metrics;

pub use collector::*;
pub use metrics::*;
