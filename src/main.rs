use std::collections::HashMap;
use std::sync::Arc;

use sensorbus::config::SimulationConfig;
use sensorbus::core::Channel;
use sensorbus::engine::{extract, IngestPipeline};
use sensorbus::persistence::{ChannelRepository, JsonChannelRepository};
use sensorbus::store::ChannelStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&path).await?,
        None => SimulationConfig::default(),
    };

    println!("----------------------- INGESTION -------------------------\n");

    let store = Arc::new(ChannelStore::new());
    let mut pipeline = IngestPipeline::new(config.generator.clone(), config.pipeline.clone())?;
    let report = pipeline.run(store.clone()).await?;

    println!("Collectors: {}", report.collectors);
    println!(
        "Samples generated: {} ({} NaN), filed: {}",
        report.samples_generated, report.nan_samples, report.samples_filed
    );
    if report.ordered_after_ingest {
        println!("The readings of every channel are ordered!");
    } else {
        println!("The readings of some channels are not ordered (concurrent collectors).");
        if report.repaired {
            println!("Channels sorted, ordered now: {}", report.ordered);
        }
    }
    println!("\n{}", pipeline.monitor().generate_report());

    println!("----------------------- EXAMPLE CHANNELS -------------------------\n");
    for id in &config.showcase_ids {
        match store.get(*id) {
            Some(channel) => print_channel(&format!("Channel {}", id), &channel),
            None => println!("Channel {}: not ingested\n", id),
        }
    }

    println!("----------------------- CHANNEL SUBSETS -------------------------\n");
    let extraction = &config.extraction;
    println!("Channels to extract subsets from: {:?}", extraction.ids);
    println!("Readings between {} ms and {} ms\n", extraction.lo, extraction.hi);

    if !report.ordered {
        let repaired = store.ensure_ordered();
        log::error!(
            "Extraction needs ordered channels; sorted {} channels first",
            repaired.len()
        );
    }
    let subsets = extract(&store, &extraction.ids, extraction.lo, extraction.hi);
    for id in &extraction.ids {
        let Some(subset) = subsets.get(id) else { continue };
        println!("Extracted channel {}:", id);
        println!("  Name: {}", subset.name);
        println!("  Unit: {}", subset.unit);
        println!("  Timestamps: {}", subset.timestamps.len());
        println!("  Values: {}", subset.values.len());
        match subset.mean() {
            Some(mean) => println!("  Average value: {:.6}", mean),
            None => println!("  Average value: n/a"),
        }
        let nan_at: Vec<String> = subset
            .nan_readings
            .iter()
            .map(|r| format!("{:.3}", r.timestamp))
            .collect();
        println!("  NaN readings: {} [{}]\n", subset.nan_readings.len(), nan_at.join(", "));
    }

    println!("----------------------- PERSISTENT STORAGE -------------------------\n");
    let repository = JsonChannelRepository::new(config.storage.dir.clone());
    persist_and_reload(&repository, &store, &config).await;

    Ok(())
}

/// Saves and reloads through the repository. Failures are logged; they do not
/// end the program.
async fn persist_and_reload(repository: &JsonChannelRepository, store: &ChannelStore, config: &SimulationConfig) {
    let single = config.storage.single_channel;
    let fallback = config.storage.fallback_channel;

    if let Err(e) = repository.save_store(store).await {
        log::error!("Saving all channels failed: {:#}", e);
    }

    match store.get(single) {
        Some(channel) => {
            if let Err(e) = repository.save_channel(&channel).await {
                log::error!("Saving channel {} failed: {:#}", single, e);
            }
        }
        None => log::warn!("Channel {} not in store, nothing to save", single),
    }

    let loaded: HashMap<u16, Channel> = match repository.load_store().await {
        Ok(loaded) => loaded.into_channels(),
        Err(e) => {
            log::error!("Loading all channels failed: {:#}", e);
            HashMap::new()
        }
    };
    println!("Loaded {} channels\n", loaded.len());

    for id in [single, fallback] {
        if let Some(channel) = loaded.get(&id) {
            print_channel(&format!("Channel {} (loaded with all channels)", id), channel);
        }

        match repository.load_channel(id).await {
            Ok(Some(channel)) => print_channel(&format!("Channel {} (loaded on its own)", id), &channel),
            Ok(None) => println!("Channel {} not found in storage\n", id),
            Err(e) => log::error!("Loading channel {} failed: {:#}", id, e),
        }
    }
}

fn print_channel(label: &str, channel: &Channel) {
    println!("{}:", label);
    println!("  ID: {}", channel.id);
    println!("  Name: {}", channel.name);
    println!("  Unit: {}", channel.unit);
    println!("  Readings: {}", channel.len());
    if let Some(first) = channel.data.first() {
        println!("  First reading: ({}, {})", first.timestamp, first.value);
    }
    println!();
}
