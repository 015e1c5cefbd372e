//! Shared error types.
//!
//! Transform-time errors live with the transform
//! ([`crate::transform::TransformError`]); everything here is a runtime
//! condition.

use thiserror::Error;

use crate::chunk::{ChunkId, ModuleId};

// ============================================================================
// ChunkLoadError
// ============================================================================

/// Network or evaluation failure while loading a chunk asset.
///
/// Surfaced to application code as an ordinary failed load; recoverable by
/// the caller. Cloneable because a terminal failure is memoized and handed to
/// every waiter of the same chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkLoadError {
    /// The asset host failed to attach or execute the asset.
    #[error("failed to load chunk `{chunk}`: {reason}")]
    Attach { chunk: ChunkId, reason: String },

    /// The in-flight load went away before settling (its driving future was
    /// dropped). Waiters observe this instead of hanging forever.
    #[error("load of chunk `{chunk}` was abandoned before settling")]
    Abandoned { chunk: ChunkId },
}

impl ChunkLoadError {
    pub fn attach(chunk: ChunkId, reason: impl Into<String>) -> Self {
        Self::Attach {
            chunk,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// RuntimeError
// ============================================================================

/// Errors from the module registry and the manifest resolution chain.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Load(#[from] ChunkLoadError),

    /// `require` ran before the owning chunk finished loading. Generated
    /// code always loads before requiring, so this is an ordering defect,
    /// not a recoverable condition.
    #[error("module `{0}` required before its owning chunk finished loading")]
    ModuleNotFound(ModuleId),

    /// A module factory failed on first evaluation.
    #[error("module `{module}` failed to evaluate: {reason}")]
    Eval { module: ModuleId, reason: String },

    /// A manifest module's exports did not decode as a chunk group.
    #[error("manifest module `{module}` did not evaluate to a chunk list")]
    ManifestShape {
        module: ModuleId,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// UpdateApplicationError
// ============================================================================

/// An update callback failed while applying a hot update.
///
/// Unrecoverable for that update: the channel does not retry it, it
/// escalates to a full page reload (see [`crate::hot::client`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to apply update for chunk `{chunk}`: {reason}")]
pub struct UpdateApplicationError {
    pub chunk: ChunkId,
    pub reason: String,
}

impl UpdateApplicationError {
    pub fn new(chunk: ChunkId, reason: impl Into<String>) -> Self {
        Self {
            chunk,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_load_error_display() {
        let err = ChunkLoadError::attach(ChunkId::new("pages-a-js"), "404");
        let display = format!("{err}");
        assert!(display.contains("pages-a-js"));
        assert!(display.contains("404"));
    }

    #[test]
    fn module_not_found_names_the_module() {
        let err = RuntimeError::ModuleNotFound(ModuleId::ecmascript("src/a.js"));
        assert!(format!("{err}").contains("src/a.js"));
    }

    #[test]
    fn update_application_error_names_the_chunk() {
        // The hot update channel logs this display on a failed application;
        // the owning chunk id must be part of it.
        let err = UpdateApplicationError::new(ChunkId::new("pages-a-js"), "bad patch");
        assert!(format!("{err}").contains("pages-a-js"));
        assert!(format!("{err}").contains("bad patch"));
    }
}
