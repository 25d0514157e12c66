use super::MetricsRegistry;

pub struct PipelineMonitor {
    registry: MetricsRegistry,
}

impl PipelineMonitor {
    pub fn new(registry: MetricsRegistry) -> Self {
        Self { registry }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.registry.snapshot();

        if snapshot.is_empty() {
            return "No workers registered".to_string();
        }

        let mut workers: Vec<_> = snapshot.values().collect();
        workers.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));

        let mut report = String::from("=== Ingestion Metrics ===\n");

        for metrics in workers {
            report.push_str(&format!(
                "\n[{}]\n  Samples: {}\n  NaN: {}\n  Channels created: {}\n  Avg latency: {}ns\n",
                metrics.worker_id,
                metrics.samples,
                metrics.nan_samples,
                metrics.channels_created,
                metrics.avg_latency_ns
            ));
        }

        report
    }

    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }
}
