use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for one pipeline worker (the generator or a collector).
pub struct WorkerMetrics {
    worker_id: String,
    samples: AtomicU64,
    nan_samples: AtomicU64,
    channels_created: AtomicU64,
    total_latency_ns: AtomicU64,
    latency_samples: AtomicU64,
}

impl WorkerMetrics {
    pub fn new(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            samples: AtomicU64::new(0),
            nan_samples: AtomicU64::new(0),
            channels_created: AtomicU64::new(0),
            total_latency_ns: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn nan_samples(&self) -> u64 {
        self.nan_samples.load(Ordering::Relaxed)
    }

    pub fn channels_created(&self) -> u64 {
        self.channels_created.load(Ordering::Relaxed)
    }

    pub fn record_sample(&self, is_nan: bool) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        if is_nan {
            self.nan_samples.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_channel_created(&self) {
        self.channels_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_processing(&self) -> Instant {
        Instant::now()
    }

    pub fn finish_processing(&self, start: Instant) {
        let latency_ns = start.elapsed().as_nanos() as u64;
        self.total_latency_ns.fetch_add(latency_ns, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_ns(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_ns.load(Ordering::Relaxed) / samples
    }
}
