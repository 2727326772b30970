use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Gateway counters, kept in a dedicated registry per app instance
pub struct GatewayMetrics {
    registry: Registry,
    pub graphs_resolved: IntCounter,
    pub stats_computed: IntCounter,
    pub validations_run: IntCounter,
    pub exports_produced: IntCounterVec,
}

impl GatewayMetrics {
    pub fn new(namespace: &str) -> prometheus::Result<Self> {
        let registry = Registry::new();

        let graphs_resolved = IntCounter::with_opts(
            Opts::new("graphs_resolved_total", "BOM hierarchy graphs resolved").namespace(namespace),
        )?;
        let stats_computed = IntCounter::with_opts(
            Opts::new("stats_computed_total", "BOM summary statistics computed").namespace(namespace),
        )?;
        let validations_run = IntCounter::with_opts(
            Opts::new("validations_run_total", "BOM item lists validated").namespace(namespace),
        )?;
        let exports_produced = IntCounterVec::new(
            Opts::new("exports_produced_total", "BOM exports produced").namespace(namespace),
            &["format"],
        )?;

        registry.register(Box::new(graphs_resolved.clone()))?;
        registry.register(Box::new(stats_computed.clone()))?;
        registry.register(Box::new(validations_run.clone()))?;
        registry.register(Box::new(exports_produced.clone()))?;

        Ok(Self {
            registry,
            graphs_resolved,
            stats_computed,
            validations_run,
            exports_produced,
        })
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
