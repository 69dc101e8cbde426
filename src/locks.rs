//! Per-channel serialization of store operations.
//!
//! Every mutating queue or reminder operation, and the scheduler's
//! pending-state read, holds the owning channel's guard for its duration.
//! Distinct channels proceed fully in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per channel.
#[derive(Clone, Default)]
pub struct ChannelLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ChannelLocks {
    /// Create an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for `channel_id`, creating its lock on first use.
    ///
    /// The returned guard is owned and may be held across awaits; dropping
    /// it releases the channel.
    pub async fn acquire(&self, channel_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(
                map.entry(channel_id.to_owned())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
