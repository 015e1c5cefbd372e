//! Chunk load cache with single-flight deduplication.
//!
//! Per-chunk records move `Pending -> Loaded | Failed` and never back (except
//! under [`RetryPolicy::RetryFailed`], where a failed record may be replaced
//! by a fresh in-flight one). The first caller for a chunk performs the
//! fetch; every concurrent caller awaits the same settlement through a watch
//! channel. Exactly one `AssetHost::attach` call per chunk id, no matter how
//! many callers race. A fetching future dropped before settling counts as a
//! failed load ([`ChunkLoadError::Abandoned`]), observed by the next caller.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::watch;

use crate::chunk::{ChunkId, ChunkKind};
use crate::error::ChunkLoadError;

use super::host::AssetHost;
use super::registry::ModuleRegistry;

// =============================================================================
// Config
// =============================================================================

/// What to do when `load` hits a chunk that already failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Hand every caller the memoized failure. The default: a settled load
    /// is never silently re-fetched.
    #[default]
    Memoize,
    /// Replace the failed record and fetch again.
    RetryFailed,
}

/// Per-session loader configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub retry_policy: RetryPolicy,
}

// =============================================================================
// LoadEntry
// =============================================================================

/// Settlement broadcast to waiters of an in-flight load. `None` until the
/// fetching caller settles the entry.
type LoadSignal = Option<Result<(), ChunkLoadError>>;

/// Per-chunk cache record.
enum LoadEntry {
    /// Fetch in flight; waiters hold a receiver onto its settlement.
    Pending(watch::Receiver<LoadSignal>),
    Loaded,
    Failed(ChunkLoadError),
}

/// This caller's part in a `load`: fetch the asset, or wait on whoever is.
enum Role {
    Fetch(watch::Sender<LoadSignal>),
    Wait(watch::Receiver<LoadSignal>),
}

// =============================================================================
// ChunkLoader
// =============================================================================

pub(super) struct ChunkLoader {
    entries: Mutex<FxHashMap<ChunkId, LoadEntry>>,
    retry_policy: RetryPolicy,
}

impl ChunkLoader {
    pub(super) fn new(retry_policy: RetryPolicy) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            retry_policy,
        }
    }

    /// Load one chunk, deduplicating against any load already settled or in
    /// flight for the same id.
    pub(super) async fn load(
        &self,
        host: &dyn AssetHost,
        modules: &ModuleRegistry,
        chunk: &ChunkId,
        kind: ChunkKind,
    ) -> Result<(), ChunkLoadError> {
        let role = {
            let mut entries = self.entries.lock();
            match entries.get(chunk) {
                Some(LoadEntry::Loaded) => return Ok(()),
                Some(LoadEntry::Failed(err)) if self.retry_policy == RetryPolicy::Memoize => {
                    return Err(err.clone());
                }
                // A live (or already settled) in-flight load: wait on it.
                Some(LoadEntry::Pending(rx))
                    if rx.has_changed().is_ok() || rx.borrow().is_some() =>
                {
                    Role::Wait(rx.clone())
                }
                // The fetching future was dropped before settling (sender
                // gone, nothing sent). Settle the entry as a failure so the
                // chunk keeps honoring the memoize/retry contract.
                Some(LoadEntry::Pending(_)) if self.retry_policy == RetryPolicy::Memoize => {
                    let err = ChunkLoadError::Abandoned {
                        chunk: chunk.clone(),
                    };
                    entries.insert(chunk.clone(), LoadEntry::Failed(err.clone()));
                    return Err(err);
                }
                // Absent, or failed/abandoned under RetryFailed: this caller
                // fetches.
                _ => {
                    let (tx, rx) = watch::channel(None);
                    entries.insert(chunk.clone(), LoadEntry::Pending(rx));
                    Role::Fetch(tx)
                }
            }
        };

        match role {
            Role::Fetch(tx) => {
                crate::debug!("loader"; "fetching chunk {chunk}");
                let result = host.attach(chunk, kind, modules).await;

                let mut entries = self.entries.lock();
                entries.insert(
                    chunk.clone(),
                    match &result {
                        Ok(()) => LoadEntry::Loaded,
                        Err(err) => LoadEntry::Failed(err.clone()),
                    },
                );
                // Waiters may all be gone; that's fine.
                let _ = tx.send(Some(result.clone()));
                result
            }
            Role::Wait(mut rx) => {
                let settled = rx.wait_for(|signal| signal.is_some()).await.map_err(|_| {
                    ChunkLoadError::Abandoned {
                        chunk: chunk.clone(),
                    }
                })?;
                settled.clone().unwrap_or_else(|| {
                    Err(ChunkLoadError::Abandoned {
                        chunk: chunk.clone(),
                    })
                })
            }
        }
    }

    /// Whether the chunk has settled successfully.
    #[cfg(test)]
    pub(super) fn is_loaded(&self, chunk: &ChunkId) -> bool {
        matches!(self.entries.lock().get(chunk), Some(LoadEntry::Loaded))
    }
}
