use sensorbus::core::IngestedSample;
use sensorbus::engine::{sample_queue, Generator, GeneratorConfig, RateTier, SampleConsumer};
use sensorbus::observability::WorkerMetrics;
use std::collections::HashMap;
use std::sync::Arc;

fn seeded(config: GeneratorConfig) -> Generator {
    let config = GeneratorConfig {
        seed: Some(42),
        ..config
    };
    Generator::new(config, Arc::new(WorkerMetrics::new("generator"))).unwrap()
}

fn drain(consumer: &SampleConsumer) -> Vec<IngestedSample> {
    std::iter::from_fn(|| consumer.try_pop()).collect()
}

#[test]
fn test_emit_tick_single_channel() {
    let mut generator = seeded(GeneratorConfig {
        tiers: vec![RateTier::new(1, 0, 1)],
        ..GeneratorConfig::default()
    });
    let (producer, consumer) = sample_queue(None);

    assert_eq!(generator.emit_tick(1, 1.0, &producer).unwrap(), 1);
    assert_eq!(consumer.len(), 1);

    let samples = drain(&consumer);
    assert_eq!(samples[0].id, 0);
    assert_eq!(samples[0].name, "Sensor_0");
    assert_eq!(samples[0].unit, "Unit_0");
    assert_eq!(samples[0].reading.timestamp, 1.0);
}

#[test]
fn test_rate_tiers_are_proportional() {
    let mut generator = seeded(GeneratorConfig::default());
    let (producer, consumer) = sample_queue(None);

    let mut emitted = 0;
    for tick in 1..=100u64 {
        emitted += generator.emit_tick(tick, tick as f64 * 10.0, &producer).unwrap();
    }

    let mut counts: HashMap<u16, usize> = HashMap::new();
    for sample in drain(&consumer) {
        *counts.entry(sample.id).or_default() += 1;
    }

    assert_eq!(emitted, 25 * 100 + 25 * 50 + 25 * 20 + 26 * 10);
    assert_eq!(counts.len(), 101);
    assert_eq!(counts[&0], 100);
    assert_eq!(counts[&24], 100);
    assert_eq!(counts[&25], 50);
    assert_eq!(counts[&60], 20);
    assert_eq!(counts[&100], 10);
    assert_eq!(counts[&0], 2 * counts[&30]);
    assert_eq!(counts[&30], 5 * counts[&80]);
}

#[test]
fn test_values_are_unit_interval_without_dropouts() {
    let mut generator = seeded(GeneratorConfig {
        nan_probability: 0.0,
        ..GeneratorConfig::default()
    });
    let (producer, consumer) = sample_queue(None);

    for tick in 1..=10u64 {
        generator.emit_tick(tick, tick as f64, &producer).unwrap();
    }

    for sample in drain(&consumer) {
        let value = sample.reading.value;
        assert!((0.0..1.0).contains(&value), "value {} outside [0, 1)", value);
    }
}

#[test]
fn test_certain_dropout_gives_only_nan() {
    let metrics = Arc::new(WorkerMetrics::new("generator"));
    let config = GeneratorConfig {
        nan_probability: 1.0,
        seed: Some(1),
        ..GeneratorConfig::default()
    };
    let mut generator = Generator::new(config, metrics.clone()).unwrap();
    let (producer, consumer) = sample_queue(None);

    generator.emit_tick(10, 100.0, &producer).unwrap();

    assert!(drain(&consumer).iter().all(|s| s.reading.is_nan()));
    assert_eq!(metrics.samples(), 101);
    assert_eq!(metrics.nan_samples(), 101);
}

#[test]
fn test_same_seed_same_values() {
    let (producer_a, consumer_a) = sample_queue(None);
    let (producer_b, consumer_b) = sample_queue(None);
    let mut a = seeded(GeneratorConfig::default());
    let mut b = seeded(GeneratorConfig::default());

    a.emit_tick(10, 5.0, &producer_a).unwrap();
    b.emit_tick(10, 5.0, &producer_b).unwrap();

    let a: Vec<_> = drain(&consumer_a).into_iter().map(|s| s.reading).collect();
    let b: Vec<_> = drain(&consumer_b).into_iter().map(|s| s.reading).collect();
    assert_eq!(a.len(), b.len());
    assert!(a.iter().zip(&b).all(|(x, y)| x.same_as(y)));
}

#[test]
fn test_run_stops_after_duration_and_finishes_queue() {
    let mut generator = seeded(GeneratorConfig {
        duration_ms: 100.0,
        tiers: vec![RateTier::new(1, 0, 2)],
        ..GeneratorConfig::default()
    });
    let (mut producer, consumer) = sample_queue(None);

    generator.run(&mut producer).unwrap();
    assert!(producer.is_finished());

    let samples: Vec<_> = std::iter::from_fn(|| consumer.pop()).collect();
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|s| s.reading.timestamp < 100.0));

    let channel_0: Vec<f64> = samples
        .iter()
        .filter(|s| s.id == 0)
        .map(|s| s.reading.timestamp)
        .collect();
    assert!(channel_0.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_run_finishes_queue_on_error() {
    let mut generator = seeded(GeneratorConfig {
        duration_ms: 1_000.0,
        ..GeneratorConfig::default()
    });
    let (mut producer, consumer) = sample_queue(None);
    drop(consumer);

    assert!(generator.run(&mut producer).is_err());
    assert!(producer.is_finished());
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = GeneratorConfig {
        tick_ms: 0,
        ..GeneratorConfig::default()
    };
    assert!(Generator::new(config, Arc::new(WorkerMetrics::new("generator"))).is_err());
}
