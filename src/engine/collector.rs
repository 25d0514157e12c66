use std::sync::Arc;
use crate::observability::{Stopwatch, WorkerMetrics};
use crate::store::ChannelStore;
use super::SampleConsumer;

/// Drains the sample queue into the channel store.
///
/// Samples are filed in pop order. Several collectors may share one queue and
/// one store, but then readings of the same channel can land out of order.
pub struct Collector {
    worker_id: usize,
    consumer: SampleConsumer,
    store: Arc<ChannelStore>,
    metrics: Arc<WorkerMetrics>,
}

impl Collector {
    pub fn new(
        worker_id: usize,
        consumer: SampleConsumer,
        store: Arc<ChannelStore>,
        metrics: Arc<WorkerMetrics>,
    ) -> Self {
        Self {
            worker_id,
            consumer,
            store,
            metrics,
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Runs until the queue reports end-of-stream. Returns the number of
    /// samples filed by this collector.
    pub fn run(self) -> usize {
        let _timer = Stopwatch::start(format!("data collector {}", self.worker_id));
        let mut filed = 0;

        while let Some(sample) = self.consumer.pop() {
            let start = self.metrics.start_processing();
            let is_nan = sample.reading.is_nan();

            if self.store.file(sample) {
                self.metrics.record_channel_created();
            }

            self.metrics.finish_processing(start);
            self.metrics.record_sample(is_nan);
            filed += 1;
        }

        log::debug!("Collector {} finished after {} samples", self.worker_id, filed);
        filed
    }
}
