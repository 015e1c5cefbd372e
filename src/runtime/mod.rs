//! Chunk loader and module registry.
//!
//! One [`Session`] per page load owns every piece of loader state: the chunk
//! load cache, the module registry, and the asset host handle. Nothing here
//! is a process-wide singleton, so independent sessions (several pages, or
//! tests) never interfere.
//!
//! ```text
//! Session::import --> load(chunk) --> AssetHost::attach --> registry
//!                      (dedup)         (script/link tag)    (require)
//! ```

mod host;
mod loader;
pub mod manifest;
pub mod registry;

pub use host::AssetHost;
pub use loader::{RetryPolicy, SessionConfig};
pub use manifest::ManifestLoader;
pub use registry::{Exports, ModuleFactory, ModuleRegistry};

use futures::future::try_join_all;
use std::sync::Arc;

use crate::chunk::{ChunkGroup, ChunkId, ChunkKind, ModuleId};
use crate::error::{ChunkLoadError, RuntimeError};

use loader::ChunkLoader;

// =============================================================================
// Session
// =============================================================================

/// Per-page-session runtime state.
///
/// Created once per page load; all caches live until the session is dropped.
/// A full reload is the only reset.
pub struct Session {
    host: Arc<dyn AssetHost>,
    loader: ChunkLoader,
    modules: ModuleRegistry,
}

impl Session {
    pub fn new(host: Arc<dyn AssetHost>) -> Self {
        Self::with_config(host, SessionConfig::default())
    }

    pub fn with_config(host: Arc<dyn AssetHost>, config: SessionConfig) -> Self {
        Self {
            host,
            loader: ChunkLoader::new(config.retry_policy),
            modules: ModuleRegistry::new(),
        }
    }

    /// The module registry, for chunk execution to register factories into.
    #[inline]
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Load one chunk. Memoized: any number of concurrent or repeated calls
    /// for the same id yield exactly one asset fetch.
    pub async fn load(&self, chunk: &ChunkId, kind: ChunkKind) -> Result<(), ChunkLoadError> {
        self.loader
            .load(self.host.as_ref(), &self.modules, chunk, kind)
            .await
    }

    /// Load every chunk of a group in parallel. Fails fast on the first
    /// chunk that fails; the rest still settle into the cache.
    pub async fn load_group(
        &self,
        group: &ChunkGroup,
        kind: ChunkKind,
    ) -> Result<(), ChunkLoadError> {
        try_join_all(group.chunk_ids().map(|chunk| self.load(chunk, kind))).await?;
        Ok(())
    }

    /// Synchronous registry lookup; see [`ModuleRegistry::require`].
    pub fn require(&self, module: &ModuleId) -> Result<Arc<Exports>, RuntimeError> {
        self.modules.require(module)
    }

    /// Load the owning chunk, then require the module.
    pub async fn import(
        &self,
        chunk: &ChunkId,
        kind: ChunkKind,
        module: &ModuleId,
    ) -> Result<Arc<Exports>, RuntimeError> {
        self.load(chunk, kind).await?;
        self.require(module)
    }
}

// =============================================================================
// Tests
// =============================================================================
