//! Metrics collection and export module

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Counters
    pub transactions_submitted: IntCounter,
    pub transactions_confirmed: IntCounter,
    /// Labelled by `reason`, the error category
    pub transactions_failed: IntCounterVec,
    pub endpoint_switches: IntCounter,

    // Gauges
    pub keepalive_subscriptions: IntGauge,

    // Histograms
    pub confirmation_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transactions_submitted = IntCounter::with_opts(Opts::new(
            "transactions_submitted",
            "Number of transactions handed to the RPC endpoint",
        ))?;

        let transactions_confirmed = IntCounter::with_opts(Opts::new(
            "transactions_confirmed",
            "Number of transactions confirmed without error",
        ))?;

        let transactions_failed = IntCounterVec::new(
            Opts::new(
                "transactions_failed",
                "Number of submitted transactions that failed on-chain or were not confirmed",
            ),
            &["reason"],
        )?;

        let endpoint_switches = IntCounter::with_opts(Opts::new(
            "endpoint_switches",
            "Number of times the active endpoint was replaced",
        ))?;

        let keepalive_subscriptions = IntGauge::with_opts(Opts::new(
            "keepalive_subscriptions",
            "Keep-alive subscriptions currently held",
        ))?;

        let confirmation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "confirmation_latency_seconds",
                "Time from submission until the requested commitment was reached",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 40.0, 60.0]),
        )?;

        registry.register(Box::new(transactions_submitted.clone()))?;
        registry.register(Box::new(transactions_confirmed.clone()))?;
        registry.register(Box::new(transactions_failed.clone()))?;
        registry.register(Box::new(endpoint_switches.clone()))?;
        registry.register(Box::new(keepalive_subscriptions.clone()))?;
        registry.register(Box::new(confirmation_latency.clone()))?;

        Ok(Self {
            registry,
            transactions_submitted,
            transactions_confirmed,
            transactions_failed,
            endpoint_switches,
            keepalive_subscriptions,
            confirmation_latency,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}
