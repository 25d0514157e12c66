use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use crate::engine::{GeneratorConfig, PipelineConfig};

/// Which channels and which time window to extract after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub ids: Vec<u16>,
    pub lo: f64,
    pub hi: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ids: vec![3, 16, 27, 45, 60, 68, 79, 91],
            lo: 10_000.0,
            hi: 20_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    /// Channel written to its own file next to `channels.json`
    pub single_channel: u16,
    /// Channel reloaded through the `channels.json` fallback
    pub fallback_channel: u16,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("storage"),
            single_channel: 32,
            fallback_channel: 65,
        }
    }
}

/// Everything the `sensorbus` binary needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub generator: GeneratorConfig,
    pub pipeline: PipelineConfig,
    pub extraction: ExtractionConfig,
    pub storage: StorageConfig,
    /// Channels whose sizes are printed after ingestion
    pub showcase_ids: Vec<u16>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            pipeline: PipelineConfig::default(),
            extraction: ExtractionConfig::default(),
            storage: StorageConfig::default(),
            showcase_ids: vec![15, 40, 65, 85],
        }
    }
}

impl SimulationConfig {
    /// Builds a config from JSON; missing sections and fields keep their
    /// defaults.
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(config).context("Failed to parse simulation config")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON in {:?}", path))?;

        Self::from_json(value)
    }

    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;

        if self.extraction.lo.is_nan() || self.extraction.hi.is_nan() {
            bail!("Extraction bounds must be numbers");
        }
        if self.extraction.lo > self.extraction.hi {
            bail!(
                "Extraction lower bound {} is above upper bound {}",
                self.extraction.lo,
                self.extraction.hi
            );
        }
        Ok(())
    }
}
