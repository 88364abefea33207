//! Push-based observability for meterwatch
//!
//! Counters are kept in a private Prometheus registry and only ever written
//! out to the log. Nothing listens for incoming requests.

pub mod metrics;

pub use metrics::Metrics;
