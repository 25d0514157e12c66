use std::collections::HashMap;
use std::sync::Arc;
use super::WorkerMetrics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub worker_id: String,
    pub samples: u64,
    pub nan_samples: u64,
    pub channels_created: u64,
    pub avg_latency_ns: u64,
}

/// Holds the metrics of every worker in one ingestion run.
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    metrics: HashMap<String, Arc<WorkerMetrics>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            metrics: HashMap::new(),
        }
    }

    /// Creates, registers and returns metrics for `worker_id`.
    pub fn register(&mut self, worker_id: impl Into<String>) -> Arc<WorkerMetrics> {
        let worker_id = worker_id.into();
        let metrics = Arc::new(WorkerMetrics::new(worker_id.clone()));
        self.metrics.insert(worker_id, metrics.clone());
        metrics
    }

    pub fn snapshot(&self) -> HashMap<String, MetricsSnapshot> {
        self.metrics
            .iter()
            .map(|(id, metrics)| {
                (
                    id.clone(),
                    MetricsSnapshot {
                        worker_id: metrics.worker_id().to_string(),
                        samples: metrics.samples(),
                        nan_samples: metrics.nan_samples(),
                        channels_created: metrics.channels_created(),
                        avg_latency_ns: metrics.avg_latency_ns(),
                    },
                )
            })
            .collect()
    }

    pub fn get(&self, worker_id: &str) -> Option<Arc<WorkerMetrics>> {
        self.metrics.get(worker_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
