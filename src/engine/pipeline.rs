use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use crate::observability::{MetricsRegistry, PipelineMonitor, Stopwatch};
use crate::store::ChannelStore;
use super::state::IngestState;
use super::{sample_queue, Collector, Generator, GeneratorConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of collectors; 0 sizes the pool from the available parallelism
    pub collectors: usize,
    /// Bound on queued samples; unbounded when absent
    pub queue_capacity: Option<usize>,
    /// Sort channels after ingestion when they came out of order
    pub repair_order: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collectors: 1,
            queue_capacity: None,
            repair_order: true,
        }
    }
}

impl PipelineConfig {
    pub fn single() -> Self {
        Self::default()
    }

    pub fn pool(collectors: usize) -> Self {
        Self {
            collectors,
            ..Self::default()
        }
    }

    /// Collector count with the automatic setting resolved: all available
    /// cores but two, at least one.
    pub fn resolved_collectors(&self) -> usize {
        if self.collectors > 0 {
            return self.collectors;
        }

        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .saturating_sub(2)
            .max(1)
    }
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub collectors: usize,
    pub samples_generated: u64,
    pub nan_samples: u64,
    pub samples_filed: u64,
    pub channel_count: usize,
    /// Whether every channel was ordered straight out of ingestion
    pub ordered_after_ingest: bool,
    /// Whether the channels were sorted afterwards
    pub repaired: bool,
    /// Whether every channel is ordered now
    pub ordered: bool,
    pub elapsed: Duration,
}

/// Generator, sample queue and collectors wired together.
///
/// Workers run on tokio's blocking pool. The generator never touches the
/// store; collectors never see each other.
pub struct IngestPipeline {
    generator_config: GeneratorConfig,
    config: PipelineConfig,
    registry: MetricsRegistry,
    state: IngestState,
}

impl IngestPipeline {
    pub fn new(generator_config: GeneratorConfig, config: PipelineConfig) -> Result<Self> {
        generator_config.validate()?;

        Ok(Self {
            generator_config,
            config,
            registry: MetricsRegistry::new(),
            state: IngestState::Idle,
        })
    }

    pub fn state(&self) -> &IngestState {
        &self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn transition_to(&mut self, new_state: IngestState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(anyhow!(
                "Invalid state transition: {} -> {}",
                self.state.name(),
                new_state.name()
            ));
        }
        self.state = new_state;
        Ok(())
    }

    /// Returns a finished pipeline to `Idle` so it can run again.
    pub fn reset(&mut self) -> Result<()> {
        self.transition_to(IngestState::Idle)
    }

    /// Generates for the configured duration and files everything into
    /// `store`. Returns once the generator and all collectors have stopped.
    pub async fn run(&mut self, store: Arc<ChannelStore>) -> Result<IngestReport> {
        let collectors = self.config.resolved_collectors();
        self.transition_to(IngestState::Running {
            start_time: Some(Instant::now()),
            collectors,
        })?;

        match self.ingest(store, collectors).await {
            Ok(report) => {
                self.transition_to(IngestState::Completed {
                    duration: Some(report.elapsed),
                    samples_filed: report.samples_filed,
                })?;
                Ok(report)
            }
            Err(e) => {
                self.state = IngestState::Failed {
                    error_msg: e.to_string(),
                };
                Err(e)
            }
        }
    }

    async fn ingest(&mut self, store: Arc<ChannelStore>, collectors: usize) -> Result<IngestReport> {
        let started = Instant::now();
        let (mut producer, consumer) = sample_queue(self.config.queue_capacity);

        let mut registry = MetricsRegistry::new();
        let generator_metrics = registry.register("generator");
        let mut generator = Generator::new(self.generator_config.clone(), generator_metrics.clone())?;

        log::info!("Starting ingestion with {} collector(s)", collectors);

        let mut collector_handles = Vec::with_capacity(collectors);
        for worker_id in 0..collectors {
            let metrics = registry.register(format!("collector-{}", worker_id));
            let collector = Collector::new(worker_id, consumer.clone(), store.clone(), metrics);
            collector_handles.push(task::spawn_blocking(move || collector.run()));
        }
        drop(consumer);
        self.registry = registry;

        let generator_handle = task::spawn_blocking(move || generator.run(&mut producer));
        let generated = generator_handle.await?;

        let mut samples_filed = 0u64;
        for handle in collector_handles {
            samples_filed += handle.await? as u64;
        }
        generated?;

        let ordered_after_ingest = store.all_ordered();
        let mut repaired = false;

        if !ordered_after_ingest {
            log::warn!(
                "{} channel(s) out of timestamp order after ingestion with {} collectors",
                store.unordered_ids().len(),
                collectors
            );

            if self.config.repair_order {
                self.transition_to(IngestState::Repairing)?;
                let _timer = Stopwatch::start("sorting channels");
                store.sort_all();
                repaired = true;
            }
        }

        let ordered = if repaired { store.all_ordered() } else { ordered_after_ingest };
        if ordered {
            log::info!("All channels ordered by timestamp");
        }

        Ok(IngestReport {
            collectors,
            samples_generated: generator_metrics.samples(),
            nan_samples: generator_metrics.nan_samples(),
            samples_filed,
            channel_count: store.len(),
            ordered_after_ingest,
            repaired,
            ordered,
            elapsed: started.elapsed(),
        })
    }

    pub fn monitor(&self) -> PipelineMonitor {
        PipelineMonitor::new(self.registry.clone())
    }
}
