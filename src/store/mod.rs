use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use crate::core::{Channel, IngestedSample};

/// Shared map of channel id to [`Channel`].
///
/// Every collector files into the same store through one lock, held only for
/// the lookup-or-create and the append of a single sample.
#[derive(Debug, Default)]
pub struct ChannelStore {
    channels: Mutex<HashMap<u16, Channel>>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let channels = channels
            .into_iter()
            .map(|channel| (channel.id, channel))
            .collect();

        Self {
            channels: Mutex::new(channels),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u16, Channel>> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends the sample's reading to its channel, creating the channel from
    /// the sample's identity on first sight. Returns true if it was created.
    pub fn file(&self, sample: IngestedSample) -> bool {
        let mut channels = self.lock();
        let mut created = false;

        let channel = channels.entry(sample.id).or_insert_with(|| {
            created = true;
            Channel::new(sample.id, sample.name, sample.unit)
        });
        channel.push(sample.reading);

        created
    }

    pub fn insert(&self, channel: Channel) -> Option<Channel> {
        self.lock().insert(channel.id, channel)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, id: u16) -> bool {
        self.lock().contains_key(&id)
    }

    /// Channel ids in ascending order
    pub fn ids(&self) -> Vec<u16> {
        let mut ids: Vec<u16> = self.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Copy of one channel
    pub fn get(&self, id: u16) -> Option<Channel> {
        self.lock().get(&id).cloned()
    }

    pub fn channel_len(&self, id: u16) -> Option<usize> {
        self.lock().get(&id).map(Channel::len)
    }

    pub fn total_readings(&self) -> usize {
        self.lock().values().map(Channel::len).sum()
    }

    /// Copies of all channels, ordered by id.
    pub fn snapshot(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self.lock().values().cloned().collect();
        channels.sort_unstable_by_key(|channel| channel.id);
        channels
    }

    pub fn into_channels(self) -> HashMap<u16, Channel> {
        self.channels
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` with read access to every channel while holding the lock.
    pub fn with_channels<R>(&self, f: impl FnOnce(&HashMap<u16, Channel>) -> R) -> R {
        let channels = self.lock();
        f(&channels)
    }

    /// True when every channel is strictly ordered by timestamp.
    pub fn all_ordered(&self) -> bool {
        self.lock().values().all(Channel::is_ordered)
    }

    /// Ids of the channels whose readings are out of order, ascending.
    pub fn unordered_ids(&self) -> Vec<u16> {
        let mut ids: Vec<u16> = self
            .lock()
            .values()
            .filter(|channel| !channel.is_ordered())
            .map(|channel| channel.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Stable-sorts every channel by timestamp.
    pub fn sort_all(&self) {
        for channel in self.lock().values_mut() {
            channel.sort_by_timestamp();
        }
    }

    /// Sorts only the channels that are out of order and returns their ids,
    /// ascending. Range extraction needs every channel ordered.
    pub fn ensure_ordered(&self) -> Vec<u16> {
        let mut repaired: Vec<u16> = self
            .lock()
            .values_mut()
            .filter(|channel| !channel.is_ordered())
            .map(|channel| {
                channel.sort_by_timestamp();
                channel.id
            })
            .collect();
        repaired.sort_unstable();
        if !repaired.is_empty() {
            log::warn!("Sorted {} out-of-order channels: {:?}", repaired.len(), repaired);
        }
        repaired
    }
}
