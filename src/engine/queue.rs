use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use crate::core::IngestedSample;

/// Creates the handoff queue between the generator and the collectors.
///
/// With `capacity` set, `push` blocks while the queue is full; without it the
/// queue grows until memory runs out.
pub fn sample_queue(capacity: Option<usize>) -> (SampleProducer, SampleConsumer) {
    let (tx, rx) = match capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };

    (SampleProducer { tx: Some(tx) }, SampleConsumer { rx })
}

/// Sending half of the sample queue. There is exactly one producer.
pub struct SampleProducer {
    tx: Option<Sender<IngestedSample>>,
}

impl SampleProducer {
    pub fn push(&self, sample: IngestedSample) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow!("Sample queue already finished"))?;

        tx.send(sample)
            .map_err(|_| anyhow!("All sample consumers disconnected"))
    }

    /// Signals that no more samples will be pushed and wakes every blocked
    /// consumer. Returns true only on the call that closed the queue.
    pub fn finish(&mut self) -> bool {
        self.tx.take().is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.tx.is_none()
    }

    /// Samples waiting in the queue
    pub fn len(&self) -> usize {
        self.tx.as_ref().map(Sender::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receiving half of the sample queue. Clone it to add consumers; every
/// sample is delivered to exactly one of them.
#[derive(Clone)]
pub struct SampleConsumer {
    rx: Receiver<IngestedSample>,
}

impl SampleConsumer {
    /// Blocks until a sample is available, or returns `None` once the
    /// producer has finished and the queue is drained.
    pub fn pop(&self) -> Option<IngestedSample> {
        self.rx.recv().ok()
    }

    /// Non-blocking variant of [`pop`](Self::pop); `None` also when empty.
    pub fn try_pop(&self) -> Option<IngestedSample> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
