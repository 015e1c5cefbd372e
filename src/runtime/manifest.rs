//! Manifest chunk indirection.
//!
//! A call site like `import('./Big')` would have to be recompiled whenever
//! `Big`'s transitive dependency set changes, destabilizing the importing
//! chunk's content hash. The generated two-level loader instead resolves the
//! real chunk list lazily through a small, rarely-changing manifest chunk:
//!
//! 1. load the manifest module's own chunk group,
//! 2. require the manifest module - its exports are the target's real
//!    chunk group,
//! 3. load that second group,
//! 4. require the target module.
//!
//! Both phases go through the session's dedup cache, so concurrent callers
//! converge on shared in-flight loads at every level. A failure at any phase
//! short-circuits the chain: the target module's factory never runs.

use std::sync::Arc;

use crate::chunk::{ChunkGroup, ChunkKind, ModuleId};
use crate::error::RuntimeError;

use super::Session;
use super::registry::Exports;

/// The generated two-level loader for one dynamic-import target.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    /// Metadata module whose exports are the target's chunk group.
    pub manifest_module: ModuleId,
    /// The manifest module's own chunk group (small and load-bearing).
    pub manifest_chunks: ChunkGroup,
    /// The module the original call site asked for.
    pub target_module: ModuleId,
}

impl ManifestLoader {
    pub fn new(
        manifest_module: ModuleId,
        manifest_chunks: ChunkGroup,
        target_module: ModuleId,
    ) -> Self {
        Self {
            manifest_module,
            manifest_chunks,
            target_module,
        }
    }

    /// Resolve the target module through the manifest indirection.
    pub async fn load(&self, session: &Session) -> Result<Arc<Exports>, RuntimeError> {
        // Phase 1: discover the chunk list.
        session
            .load_group(&self.manifest_chunks, ChunkKind::Manifest)
            .await?;
        let manifest = session.require(&self.manifest_module)?;
        let chunks: ChunkGroup =
            serde_json::from_value((*manifest).clone()).map_err(|source| {
                RuntimeError::ManifestShape {
                    module: self.manifest_module.clone(),
                    source,
                }
            })?;

        // Phase 2: load it, then resolve the target.
        session.load_group(&chunks, ChunkKind::Script).await?;
        session.require(&self.target_module)
    }
}

// =============================================================================
// Tests
// =============================================================================
