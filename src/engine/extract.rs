use std::collections::HashMap;
use crate::core::{Channel, ExtractedSubset};
use crate::observability::Stopwatch;
use crate::store::ChannelStore;

/// Extracts the readings with `lo <= timestamp <= hi` from each requested
/// channel, one [`ExtractedSubset`] per distinct id.
///
/// Channels must already be sorted by timestamp (single collector, or
/// [`ChannelStore::sort_all`] after a multi-collector run); the window is
/// located by binary search. Unknown ids get an empty subset. A reversed or
/// NaN window yields empty subsets.
pub fn extract(store: &ChannelStore, ids: &[u16], lo: f64, hi: f64) -> HashMap<u16, ExtractedSubset> {
    let _timer = Stopwatch::start("subset retrieval");
    store.with_channels(|channels| extract_channels(channels, ids, lo, hi))
}

/// [`extract`] over a plain channel map, e.g. channels loaded from disk.
pub fn extract_channels(
    channels: &HashMap<u16, Channel>,
    ids: &[u16],
    lo: f64,
    hi: f64,
) -> HashMap<u16, ExtractedSubset> {
    let mut subsets = HashMap::with_capacity(ids.len());

    for &id in ids {
        if subsets.contains_key(&id) {
            continue;
        }

        let subset = match channels.get(&id) {
            Some(channel) => channel.subset(lo, hi),
            None => {
                log::debug!("Channel {} not in store, returning empty subset", id);
                ExtractedSubset::empty(id)
            }
        };
        subsets.insert(id, subset);
    }

    subsets
}
