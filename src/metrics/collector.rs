// src/metrics/collector.rs
use prometheus::{
    Encoder, GaugeVec, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use anyhow::Result;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct MetricsCollector {
    // Selection metrics
    pub selections_total: IntCounterVec,
    pub selection_errors_total: IntCounterVec,
    pub tie_set_size: Histogram,

    // Pool metrics
    pub server_load: GaugeVec,
    pub pool_size: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let selections_total = IntCounterVec::new(
            Opts::new("selector_selections_total", "Total number of selections per server"),
            &["server"],
        )?;
        registry.register(Box::new(selections_total.clone()))?;

        let selection_errors_total = IntCounterVec::new(
            Opts::new("selector_selection_errors_total", "Rejected engine operations"),
            &["reason"],
        )?;
        registry.register(Box::new(selection_errors_total.clone()))?;

        let tie_set_size = Histogram::with_opts(
            HistogramOpts::new(
                "selector_tie_set_size",
                "Number of servers tied at the best rank per selection",
            )
            .buckets(vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0]),
        )?;
        registry.register(Box::new(tie_set_size.clone()))?;

        let server_load = GaugeVec::new(
            Opts::new("selector_server_load", "In-flight requests assigned to a server"),
            &["server"],
        )?;
        registry.register(Box::new(server_load.clone()))?;

        let pool_size = IntGauge::new("selector_pool_size", "Number of servers in the pool")?;
        registry.register(Box::new(pool_size.clone()))?;

        Ok(Self {
            selections_total,
            selection_errors_total,
            tie_set_size,
            server_load,
            pool_size,
        })
    }

    pub fn record_selection(&self, server: &str, load: f64, tie_set_size: usize) {
        self.selections_total.with_label_values(&[server]).inc();
        self.server_load.with_label_values(&[server]).set(load);
        self.tie_set_size.observe(tie_set_size as f64);
    }

    pub fn record_error(&self, reason: &str) {
        self.selection_errors_total.with_label_values(&[reason]).inc();
    }

    pub fn update_server_load(&self, server: &str, load: f64) {
        self.server_load.with_label_values(&[server]).set(load);
    }

    pub fn forget_server(&self, server: &str) {
        let _ = self.server_load.remove_label_values(&[server]);
    }

    pub fn update_pool_size(&self, size: usize) {
        self.pool_size.set(size as i64);
    }
}
