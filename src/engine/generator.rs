use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use crate::core::{IngestedSample, Reading};
use crate::observability::{Stopwatch, WorkerMetrics};
use super::SampleProducer;

/// A block of channel ids sampled every `every_n_ticks` generator ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    pub every_n_ticks: u64,
    /// First channel id of the tier
    pub first_id: u16,
    /// One past the last channel id of the tier
    pub end_id: u16,
}

impl RateTier {
    pub fn new(every_n_ticks: u64, first_id: u16, end_id: u16) -> Self {
        Self {
            every_n_ticks,
            first_id,
            end_id,
        }
    }

    pub fn is_active(&self, tick: u64) -> bool {
        tick % self.every_n_ticks == 0
    }

    pub fn contains(&self, id: u16) -> bool {
        (self.first_id..self.end_id).contains(&id)
    }

    pub fn channel_count(&self) -> usize {
        (self.end_id - self.first_id) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// How long to generate, in milliseconds since the generator started
    pub duration_ms: f64,
    pub tick_ms: u64,
    /// Chance that a sample is replaced by a NaN dropout
    pub nan_probability: f64,
    pub tiers: Vec<RateTier>,
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            duration_ms: 30_000.0,
            tick_ms: 10,
            nan_probability: 0.005,
            // ids [0, 25) every tick down to [75, 101) every 10th tick
            tiers: vec![
                RateTier::new(1, 0, 25),
                RateTier::new(2, 25, 50),
                RateTier::new(5, 50, 75),
                RateTier::new(10, 75, 101),
            ],
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            bail!("Generator duration must be a non-negative number, got {}", self.duration_ms);
        }
        if self.tick_ms == 0 {
            bail!("Generator tick must be at least 1 ms");
        }
        if !(0.0..=1.0).contains(&self.nan_probability) {
            bail!("NaN probability must be within [0, 1], got {}", self.nan_probability);
        }
        for tier in &self.tiers {
            if tier.every_n_ticks == 0 {
                bail!("Rate tier [{}, {}) has a zero tick period", tier.first_id, tier.end_id);
            }
            if tier.first_id >= tier.end_id {
                bail!("Rate tier [{}, {}) has an empty id range", tier.first_id, tier.end_id);
            }
        }
        Ok(())
    }

    /// Total number of channel ids covered by the tiers
    pub fn channel_count(&self) -> usize {
        self.tiers.iter().map(RateTier::channel_count).sum()
    }
}

/// Name and unit the generator attaches to channel `id`.
pub fn channel_identity(id: u16) -> (String, String) {
    (format!("Sensor_{}", id), format!("Unit_{}", id))
}

/// Simulated sensor source feeding the sample queue at tiered rates.
pub struct Generator {
    config: GeneratorConfig,
    rng: StdRng,
    metrics: Arc<WorkerMetrics>,
}

impl Generator {
    pub fn new(config: GeneratorConfig, metrics: Arc<WorkerMetrics>) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            config,
            rng,
            metrics,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Pushes one sample for every id of every tier active on `tick`, all
    /// stamped with `timestamp`. Returns how many were pushed.
    pub fn emit_tick(&mut self, tick: u64, timestamp: f64, producer: &SampleProducer) -> Result<usize> {
        let mut emitted = 0;

        for tier in &self.config.tiers {
            if !tier.is_active(tick) {
                continue;
            }

            for id in tier.first_id..tier.end_id {
                let mut value: f64 = self.rng.random();
                if self.rng.random_bool(self.config.nan_probability) {
                    value = f64::NAN;
                }

                let (name, unit) = channel_identity(id);
                producer.push(IngestedSample::new(id, name, unit, Reading::new(timestamp, value)))?;
                self.metrics.record_sample(value.is_nan());
                emitted += 1;
            }
        }

        Ok(emitted)
    }

    /// Generates until `duration_ms` has elapsed, then finishes the producer.
    /// The producer is finished on the error path too, so collectors always
    /// see end-of-stream.
    pub fn run(&mut self, producer: &mut SampleProducer) -> Result<()> {
        let _timer = Stopwatch::start("data generator");

        let result = self.drive(producer);
        producer.finish();
        result
    }

    fn drive(&mut self, producer: &SampleProducer) -> Result<()> {
        let start = Instant::now();
        let tick_interval = Duration::from_millis(self.config.tick_ms);
        let mut tick: u64 = 1;

        loop {
            let timestamp = start.elapsed().as_micros() as f64 / 1e3;
            if timestamp >= self.config.duration_ms {
                break;
            }

            self.emit_tick(tick, timestamp, producer)?;
            thread::sleep(tick_interval);
            tick += 1;
        }

        log::debug!(
            "Generator stopped after {} ticks, {} samples",
            tick - 1,
            self.metrics.samples()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_cover_101_channels() {
        let config = GeneratorConfig::default();
        assert_eq!(config.channel_count(), 101);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let config = GeneratorConfig {
            nan_probability: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_tier() {
        let config = GeneratorConfig {
            tiers: vec![RateTier::new(1, 10, 10)],
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tier_activity() {
        let tier = RateTier::new(5, 50, 75);
        assert!(!tier.is_active(4));
        assert!(tier.is_active(5));
        assert!(tier.is_active(10));
        assert!(tier.contains(50));
        assert!(!tier.contains(75));
    }
}
