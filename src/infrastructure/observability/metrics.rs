//! Prometheus metrics definitions for meterwatch
//!
//! All metrics use the `meterwatch_` prefix. They are never served over HTTP;
//! the rendered text is written to the log on shutdown.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Process-wide counters for the poll loop, the session reader and the writer
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Poll cycles by outcome (`ok` / `error`)
    pub polls_total: CounterVec,
    /// Last observed meter balance
    pub meter_balance: GenericGauge<AtomicF64>,
    /// Session re-bootstraps triggered by an expiry redirect
    pub session_refreshes_total: IntCounter,
    /// Points accepted by the log store
    pub points_flushed_total: IntCounter,
    /// Batches the log store failed to accept
    pub flush_failures_total: IntCounter,
    /// Upstream request latency in seconds
    pub api_latency_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let polls_total = CounterVec::new(
            Opts::new("meterwatch_polls_total", "Poll cycles by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(polls_total.clone()))?;

        let meter_balance = Gauge::with_opts(Opts::new(
            "meterwatch_meter_balance",
            "Last observed meter balance",
        ))?;
        registry.register(Box::new(meter_balance.clone()))?;

        let session_refreshes_total = IntCounter::with_opts(Opts::new(
            "meterwatch_session_refreshes_total",
            "Session re-bootstraps after an expiry redirect",
        ))?;
        registry.register(Box::new(session_refreshes_total.clone()))?;

        let points_flushed_total = IntCounter::with_opts(Opts::new(
            "meterwatch_points_flushed_total",
            "Metric points accepted by the log store",
        ))?;
        registry.register(Box::new(points_flushed_total.clone()))?;

        let flush_failures_total = IntCounter::with_opts(Opts::new(
            "meterwatch_flush_failures_total",
            "Batches rejected by or not delivered to the log store",
        ))?;
        registry.register(Box::new(flush_failures_total.clone()))?;

        let api_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "meterwatch_api_latency_seconds",
                "Upstream request latency in seconds",
            )
            .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["service", "endpoint"],
        )?;
        registry.register(Box::new(api_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            polls_total,
            meter_balance,
            session_refreshes_total,
            points_flushed_total,
            flush_failures_total,
            api_latency_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_polls(&self, outcome: &str) {
        self.polls_total.with_label_values(&[outcome]).inc();
    }

    /// Observe API latency
    pub fn observe_api_latency(&self, service: &str, endpoint: &str, latency: f64) {
        self.api_latency_seconds
            .with_label_values(&[service, endpoint])
            .observe(latency);
    }
}
