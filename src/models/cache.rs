use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::denylist::{ApiError, DenylistSource};

/// One full copy of the upstream flagged set, stamped with the time it was
/// fetched.
#[derive(Clone)]
pub struct Snapshot {
    pub ids: HashSet<String>,
    pub refreshed_at: Instant,
}

impl Snapshot {
    pub fn age(&self) -> Duration {
        self.refreshed_at.elapsed()
    }
}

/// Lookup result. `Unknown` means no snapshot has ever been populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Flagged,
    Clear,
    Unknown,
}

/// Expiring snapshot cache with single-flight refresh.
///
/// Lookups answer from the current snapshot while it is inside the validity
/// window. Once it expires, the first caller to claim the refresh right
/// fetches a replacement; every other caller keeps reading the old snapshot
/// instead of piling onto the denylist service.
pub struct SnapshotCache {
    source: Arc<dyn DenylistSource>,
    snapshot: RwLock<Option<Snapshot>>,
    // Exclusive refresh right. Held only around fetch-and-replace, never
    // around the fast-path read.
    refresh: Mutex<()>,
    validity: Duration,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn DenylistSource>, validity: Duration) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
            refresh: Mutex::new(()),
            validity,
        }
    }

    /// Report whether `id` is flagged in the current snapshot, refreshing it
    /// first if it has expired and nobody else is already doing so.
    ///
    /// Upstream failures never surface here: the previous snapshot (even an
    /// expired one) keeps answering, and the next call re-attempts the fetch.
    pub async fn check(&self, id: &str) -> Verdict {
        self.ensure_fresh().await;
        self.verdict_for(id)
    }

    /// Current snapshot contents, refreshing first under the same
    /// single-flight rules as `check`.
    pub async fn current(&self) -> Option<Snapshot> {
        self.ensure_fresh().await;
        self.read_snapshot().clone()
    }

    /// Forced refresh: waits for the refresh right, always fetches, and
    /// reports the upstream error to the caller who asked for it. Returns
    /// the size of the new snapshot.
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        let _guard = self.refresh.lock().await;
        let ids = self.source.fetch_flagged().await?;
        let count = ids.len();
        self.install(ids);
        Ok(count)
    }

    async fn ensure_fresh(&self) {
        if self.is_fresh() {
            return;
        }
        // Someone else is already refreshing: keep serving what we have
        // rather than queuing behind their fetch.
        let Ok(_guard) = self.refresh.try_lock() else {
            debug!("Refresh already in flight, answering from current snapshot");
            return;
        };
        // Re-check under the right: another caller may have finished a
        // refresh between our expiry check and the lock acquisition.
        if self.is_fresh() {
            return;
        }
        match self.source.fetch_flagged().await {
            Ok(ids) => self.install(ids),
            Err(e) => warn!("Denylist refresh failed, keeping previous snapshot: {}", e),
        }
    }

    fn is_fresh(&self) -> bool {
        self.read_snapshot()
            .as_ref()
            .is_some_and(|snapshot| snapshot.age() < self.validity)
    }

    fn install(&self, ids: HashSet<String>) {
        debug!("Installing denylist snapshot with {} entries", ids.len());
        *self.write_snapshot() = Some(Snapshot {
            ids,
            refreshed_at: Instant::now(),
        });
    }

    fn verdict_for(&self, id: &str) -> Verdict {
        match self.read_snapshot().as_ref() {
            Some(snapshot) if snapshot.ids.contains(id) => Verdict::Flagged,
            Some(_) => Verdict::Clear,
            None => Verdict::Unknown,
        }
    }

    fn read_snapshot(&self) -> RwLockReadGuard<'_, Option<Snapshot>> {
        match self.snapshot.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Recovered from poisoned snapshot lock");
                poisoned.into_inner()
            }
        }
    }

    fn write_snapshot(&self) -> RwLockWriteGuard<'_, Option<Snapshot>> {
        match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Recovered from poisoned snapshot lock");
                poisoned.into_inner()
            }
        }
    }

    #[cfg(test)]
    fn seed(&self, ids: &[&str], age: Duration) {
        *self.write_snapshot() = Some(Snapshot {
            ids: ids.iter().map(|id| id.to_string()).collect(),
            refreshed_at: Instant::now() - age,
        });
    }
}
