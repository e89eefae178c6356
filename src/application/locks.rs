use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// A registry of per-key async mutexes.
///
/// Used as an advisory lock: the orchestrator holds the room's entry across
/// its availability check and booking insert, and a single per-booking map
/// shared by the orchestrator and the reconciler serializes capture,
/// cancellation, and the hold sweep on the same booking row.
#[derive(Default, Clone)]
pub struct LockMap {
    inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl LockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, creating it on first use. The guard owns
    /// its mutex, so it stays valid after the registry lock is released.
    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().await;
            map.entry(key).or_insert_with(Default::default).clone()
        };
        entry.lock_owned().await
    }
}
