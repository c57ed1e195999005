//! Per-identity concurrency control.
//!
//! Session lookups and conversation calls for one identity must not
//! interleave: two messages from the same user are handled one after the
//! other, while different identities proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use lr_domain::identity::IdentityKey;

/// Each identity maps to an async mutex.  Holding the guard gives
/// exclusive access for one event at a time.
pub struct IdentityLockMap {
    locks: Mutex<HashMap<IdentityKey, Arc<AsyncMutex<()>>>>,
}

impl Default for IdentityLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for the identity's lock.  The guard releases on drop.
    pub async fn acquire(&self, identity: &IdentityKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(identity.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop locks nobody holds or waits on.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        // Guards and pending acquires each hold a clone of the mutex.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
