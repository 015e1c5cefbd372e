//! Asset host collaborator.
//!
//! The loader itself never touches the document. Attaching a script tag or
//! stylesheet link, waiting for the browser's load event, and executing the
//! chunk's module factories all happen behind this trait, which keeps the
//! loader testable and the embedding (real DOM, jsdom, test double) swappable.

use async_trait::async_trait;

use crate::chunk::{ChunkId, ChunkKind};
use crate::error::ChunkLoadError;
use crate::runtime::registry::ModuleRegistry;

/// Attaches chunk assets to the document.
///
/// `attach` is called at most once per chunk id for the lifetime of a
/// session (the loader memoizes settlements). Executable chunks register
/// their module factories into `modules` before resolving; stylesheet chunks
/// resolve on the link element's load event.
#[async_trait]
pub trait AssetHost: Send + Sync {
    async fn attach(
        &self,
        chunk: &ChunkId,
        kind: ChunkKind,
        modules: &ModuleRegistry,
    ) -> Result<(), ChunkLoadError>;
}
