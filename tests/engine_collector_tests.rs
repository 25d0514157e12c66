use sensorbus::core::{IngestedSample, Reading};
use sensorbus::engine::{sample_queue, Collector};
use sensorbus::observability::WorkerMetrics;
use sensorbus::store::ChannelStore;
use std::sync::Arc;
use std::thread;

fn sample(id: u16, timestamp: f64, value: f64) -> IngestedSample {
    IngestedSample::new(id, format!("Sensor_{}", id), format!("Unit_{}", id), Reading::new(timestamp, value))
}

#[test]
fn test_collector_files_until_end_of_stream() {
    let store = Arc::new(ChannelStore::new());
    let metrics = Arc::new(WorkerMetrics::new("collector-0"));
    let (mut producer, consumer) = sample_queue(None);

    producer.push(sample(1, 1.0, 0.1)).unwrap();
    producer.push(sample(2, 1.0, f64::NAN)).unwrap();
    producer.push(sample(1, 2.0, 0.3)).unwrap();
    producer.finish();

    let collector = Collector::new(0, consumer.clone(), store.clone(), metrics.clone());
    assert_eq!(collector.run(), 3);

    assert!(consumer.is_empty());
    assert_eq!(store.len(), 2);
    assert_eq!(store.channel_len(1), Some(2));
    assert!(store.get(2).unwrap().data[0].is_nan());
    assert!(store.all_ordered());

    assert_eq!(metrics.samples(), 3);
    assert_eq!(metrics.nan_samples(), 1);
    assert_eq!(metrics.channels_created(), 2);
}

#[test]
fn test_collector_files_in_pop_order() {
    let store = Arc::new(ChannelStore::new());
    let (mut producer, consumer) = sample_queue(None);

    // A single collector keeps whatever order the queue delivers
    producer.push(sample(5, 3.0, 0.0)).unwrap();
    producer.push(sample(5, 1.0, 0.0)).unwrap();
    producer.finish();

    Collector::new(0, consumer, store.clone(), Arc::new(WorkerMetrics::new("c"))).run();

    let timestamps: Vec<f64> = store.get(5).unwrap().data.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![3.0, 1.0]);
}

#[test]
fn test_collector_pool_shares_the_work() {
    const PER_CHANNEL: usize = 5_000;
    let store = Arc::new(ChannelStore::new());
    let (mut producer, consumer) = sample_queue(None);

    let mut handles = vec![];
    for worker_id in 0..4 {
        let metrics = Arc::new(WorkerMetrics::new(format!("collector-{}", worker_id)));
        let collector = Collector::new(worker_id, consumer.clone(), store.clone(), metrics);
        handles.push(thread::spawn(move || collector.run()));
    }
    drop(consumer);

    for i in 0..PER_CHANNEL {
        for id in 0..4 {
            producer.push(sample(id, i as f64, 0.5)).unwrap();
        }
    }
    producer.finish();

    let filed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(filed, 4 * PER_CHANNEL);
    assert_eq!(store.total_readings(), 4 * PER_CHANNEL);

    // Order across collectors is not guaranteed until the channels are sorted
    store.sort_all();
    assert!(store.all_ordered());
    for id in 0..4 {
        assert_eq!(store.channel_len(id), Some(PER_CHANNEL));
    }
}
