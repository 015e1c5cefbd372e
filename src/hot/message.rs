//! Hot update wire protocol.
//!
//! JSON text frames over a persistent connection. Every message is
//! chunk-scoped:
//!
//! ```text
//! client -> server: {"type":"subscribe","chunkId":"<ChunkId>"}
//! server -> client: {"type":"restart","chunkId":"<ChunkId>"}
//! server -> client: {"type":"partial","chunkId":"<ChunkId>", ...patch fields}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chunk::ChunkId;

// =============================================================================
// UpdateMessage (server -> client)
// =============================================================================

/// An update pushed by the dev server for one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UpdateMessage {
    /// The chunk must be discarded and reloaded - the only option for
    /// non-patchable assets such as CSS.
    Restart {
        #[serde(rename = "chunkId")]
        chunk_id: ChunkId,
    },

    /// An update applicable in place without discarding the chunk. The
    /// patch-specific fields ride along untouched.
    Partial {
        #[serde(rename = "chunkId")]
        chunk_id: ChunkId,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
}

impl UpdateMessage {
    /// Create a restart message.
    pub fn restart(chunk_id: impl Into<ChunkId>) -> Self {
        Self::Restart {
            chunk_id: chunk_id.into(),
        }
    }

    /// Create a partial message with patch fields.
    pub fn partial(chunk_id: impl Into<ChunkId>, payload: Map<String, Value>) -> Self {
        Self::Partial {
            chunk_id: chunk_id.into(),
            payload,
        }
    }

    /// The chunk this update targets.
    pub fn chunk_id(&self) -> &ChunkId {
        match self {
            Self::Restart { chunk_id } | Self::Partial { chunk_id, .. } => chunk_id,
        }
    }

    /// Serialize to a JSON frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"restart"}"#.to_string())
    }

    /// Parse a JSON frame.
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

// =============================================================================
// ClientMessage (client -> server)
// =============================================================================

/// A frame sent by the browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Ask the server to push updates for one chunk. Idempotent server-side.
    Subscribe {
        #[serde(rename = "chunkId")]
        chunk_id: ChunkId,
    },
}

impl ClientMessage {
    /// Create a subscribe message.
    pub fn subscribe(chunk_id: impl Into<ChunkId>) -> Self {
        Self::Subscribe {
            chunk_id: chunk_id.into(),
        }
    }

    /// Serialize to a JSON frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::new())
    }

    /// Parse a JSON frame.
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

// =============================================================================
// Tests
// =============================================================================
