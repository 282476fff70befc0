//! Once-populated cache of the partition ids addressable on the network.
//!
//! The cache is filled from the first available backend and then treated as
//! immutable for the process lifetime. A network that gains partitions after
//! initialization is not reflected; see the discovery notes in `DESIGN.md`.

use std::future::Future;

use tokio::sync::OnceCell;

use crate::error::Result;
use crate::types::PartitionId;

/// Ordered sequence of valid partition ids, discovered at most once.
#[derive(Debug, Default)]
pub struct PartitionRegistry {
    cached: OnceCell<Vec<PartitionId>>,
}

impl PartitionRegistry {
    pub fn new() -> Self {
        Self {
            cached: OnceCell::new(),
        }
    }

    /// Seeds the cache with an already-discovered partition list. A no-op if
    /// the cache is populated.
    pub fn prime(&self, partitions: Vec<PartitionId>) {
        let _ = self.cached.set(partitions);
    }

    /// Returns the cached partition list, running `discover` to populate it
    /// on first use. Concurrent first calls race on a single discovery; a
    /// failed discovery leaves the cache empty rather than partially filled.
    pub async fn get_or_discover<F, Fut>(&self, discover: F) -> Result<&[PartitionId]>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<PartitionId>>>,
    {
        self.cached
            .get_or_try_init(discover)
            .await
            .map(|ids| ids.as_slice())
    }
}
