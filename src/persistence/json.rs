use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use crate::core::{Channel, Reading};
use crate::observability::Stopwatch;
use crate::store::ChannelStore;
use super::ChannelRepository;

const ALL_CHANNELS_FILE: &str = "channels.json";

/// Stores channels as human-readable JSON files in one directory:
/// `channels.json` holds every channel keyed by id, `channel_<id>.json` holds
/// a single channel saved on its own.
///
/// NaN readings are written as `null`.
pub struct JsonChannelRepository {
    storage_dir: PathBuf,
}

impl JsonChannelRepository {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn all_channels_path(&self) -> PathBuf {
        self.storage_dir.join(ALL_CHANNELS_FILE)
    }

    pub fn channel_path(&self, id: u16) -> PathBuf {
        self.storage_dir.join(format!("channel_{}.json", id))
    }

    async fn write_atomic(&self, path: &Path, json: String) -> Result<()> {
        fs::create_dir_all(&self.storage_dir)
            .await
            .with_context(|| format!("Failed to create storage directory {:?}", self.storage_dir))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)
            .await
            .with_context(|| format!("Failed to write {:?}", temp_path))?;

        fs::rename(&temp_path, path)
            .await
            .with_context(|| format!("Failed to move {:?} into place", path))?;

        Ok(())
    }

    async fn read_json(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;

        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {:?}", path))
    }

    async fn read_all_records(&self) -> Result<Map<String, Value>> {
        let path = self.all_channels_path();
        match self.read_json(&path).await? {
            Value::Object(records) => Ok(records),
            other => anyhow::bail!(
                "Expected an object of channels in {:?}, found {}",
                path,
                json_kind(&other)
            ),
        }
    }
}

/// Stored channel as read back, with readings still undecoded.
#[derive(Deserialize)]
struct ChannelRecord {
    id: u16,
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    data: Vec<Value>,
}

/// Decodes one stored channel. A record without a usable id is skipped;
/// missing name or unit default to empty, and malformed readings are
/// dropped one by one.
fn decode_channel(key: &str, record: Value) -> Option<Channel> {
    let record = match serde_json::from_value::<ChannelRecord>(record) {
        Ok(record) => record,
        Err(e) => {
            log::warn!("Skipping malformed channel record {}: {}", key, e);
            return None;
        }
    };

    let mut channel = Channel::new(record.id, record.name, record.unit);
    let stored = record.data.len();
    for reading in record.data {
        match serde_json::from_value::<Reading>(reading) {
            Ok(reading) => channel.push(reading),
            Err(e) => log::debug!("Channel record {}: bad reading: {}", key, e),
        }
    }
    if channel.len() < stored {
        log::warn!(
            "Channel record {}: skipped {} of {} malformed readings",
            key,
            stored - channel.len(),
            stored
        );
    }
    Some(channel)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl ChannelRepository for JsonChannelRepository {
    async fn save_store(&self, store: &ChannelStore) -> Result<()> {
        let _timer = Stopwatch::start("saving all channels");

        let mut records = Map::new();
        for channel in store.snapshot() {
            let record = serde_json::to_value(&channel)
                .with_context(|| format!("Failed to serialize channel {}", channel.id))?;
            records.insert(channel.id.to_string(), record);
        }
        let count = records.len();

        let json = serde_json::to_string_pretty(&Value::Object(records))
            .context("Failed to serialize channels")?;
        self.write_atomic(&self.all_channels_path(), json).await?;

        log::info!("Saved {} channels to {:?}", count, self.all_channels_path());
        Ok(())
    }

    async fn save_channel(&self, channel: &Channel) -> Result<()> {
        let json = serde_json::to_string_pretty(channel)
            .with_context(|| format!("Failed to serialize channel {}", channel.id))?;

        let path = self.channel_path(channel.id);
        self.write_atomic(&path, json).await?;

        log::info!("Saved channel {} to {:?}", channel.id, path);
        Ok(())
    }

    async fn load_store(&self) -> Result<ChannelStore> {
        let _timer = Stopwatch::start("loading all channels");

        let records = self.read_all_records().await?;
        let channels: Vec<Channel> = records
            .into_iter()
            .filter_map(|(key, record)| decode_channel(&key, record))
            .collect();

        log::info!("Loaded {} channels from {:?}", channels.len(), self.all_channels_path());
        Ok(ChannelStore::from_channels(channels))
    }

    async fn load_channel(&self, id: u16) -> Result<Option<Channel>> {
        let path = self.channel_path(id);

        if fs::try_exists(&path).await.unwrap_or(false) {
            log::debug!("Found separate file for channel {}", id);
            match self.read_json(&path).await {
                Ok(record) => {
                    if let Some(channel) = decode_channel(&id.to_string(), record) {
                        return Ok(Some(channel));
                    }
                }
                Err(e) => log::warn!("Ignoring unreadable channel file: {:#}", e),
            }
        }

        log::debug!("Searching {:?} for channel {}", self.all_channels_path(), id);
        let records = self.read_all_records().await?;

        let found = records
            .into_iter()
            .find(|(_, record)| record.get("id").and_then(Value::as_u64) == Some(u64::from(id)))
            .and_then(|(key, record)| decode_channel(&key, record));

        if found.is_none() {
            log::info!("No stored channel with id {}", id);
        }
        Ok(found)
    }
}
