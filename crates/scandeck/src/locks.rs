//! Per-filename advisory locks.
//!
//! Two concurrent requests touching the same artifact (scan into an explicit
//! name, repair during merge, thumbnail generation from parallel listings,
//! delete) must not interleave their write/check windows. The registry hands
//! out one async mutex per artifact name; pipelines hold the guard across the
//! whole write + integrity + repair sequence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-artifact-name locks. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one artifact name, waiting if another task holds
    /// it. The guard releases on drop.
    pub async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds anymore are garbage; sweep before growing.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(map.entry(name.to_string()).or_default())
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_name_serializes() {
        let locks = PathLocks::new();
        let guard = locks.lock("a.png").await;

        let locks2 = locks.clone();
        let contender = tokio::spawn(async move { locks2.lock("a.png").await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_names_are_independent() {
        let locks = PathLocks::new();
        let _a = locks.lock("a.png").await;
        // Must not block.
        let _b = locks.lock("b.png").await;
    }

    #[tokio::test]
    async fn released_entries_are_swept() {
        let locks = PathLocks::new();
        drop(locks.lock("a.png").await);
        drop(locks.lock("b.png").await);
        let _c = locks.lock("c.png").await;
        let map = locks.inner.lock().unwrap();
        assert_eq!(map.len(), 1);
    }
}
