pub mod json;

use anyhow::Result;
use async_trait::async_trait;
use crate::core::Channel;
use crate::store::ChannelStore;

pub use json::JsonChannelRepository;

/// Durable storage for channels.
///
/// Implementations must round-trip every field, NaN values included, and keep
/// readings in the order they were stored.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Persists every channel of the store.
    async fn save_store(&self, store: &ChannelStore) -> Result<()>;

    /// Persists one channel on its own.
    async fn save_channel(&self, channel: &Channel) -> Result<()>;

    /// Restores the channels written by [`save_store`](Self::save_store).
    async fn load_store(&self) -> Result<ChannelStore>;

    /// Restores one channel; `Ok(None)` when no stored channel has that id.
    async fn load_channel(&self, id: u16) -> Result<Option<Channel>>;
}
