//! Chunk and module identifiers.
//!
//! - [`ChunkId`]: stable name of one compiled output asset
//! - [`ChunkKind`]: closed set of asset kinds, dispatched as a tagged enum
//! - [`ModuleId`] / [`ModuleKind`]: one module record, namespaced by source
//!   path plus a kind tag
//! - [`ChunkGroup`] / [`GroupEntry`]: the ordered chunk list an entry point
//!   needs, with its string-or-object wire encoding

mod group;

pub use group::{ChunkGroup, GroupEntry};

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ChunkId
// =============================================================================

/// Opaque stable name of one compiled output asset (script or stylesheet).
///
/// Computed at build time from an explicit annotation or from the module path
/// relative to the source root, with non-word characters replaced by `-` (see
/// [`crate::transform::resolve_chunk_name`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChunkId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChunkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// ChunkKind
// =============================================================================

/// Kind of chunk asset.
///
/// A closed set: loader behavior is dispatched on this tag, never inferred
/// from the chunk id at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// Executable chunk, attached as a script element.
    Script,
    /// Stylesheet chunk, attached as a link element.
    Style,
    /// Manifest chunk: a script whose single module evaluates to the real
    /// chunk list for a target.
    Manifest,
}

// =============================================================================
// ModuleId
// =============================================================================

/// Kind tag namespacing a module record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Ordinary evaluated module.
    Ecmascript,
    /// The metadata module inside a manifest chunk.
    ManifestChunk,
    /// The generated two-level loader for a manifest chunk.
    ManifestChunkLoader,
}

impl ModuleKind {
    /// Wire tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ecmascript => "ecmascript",
            Self::ManifestChunk => "manifest chunk",
            Self::ManifestChunkLoader => "manifest chunk, loader",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ecmascript" => Some(Self::Ecmascript),
            "manifest chunk" => Some(Self::ManifestChunk),
            "manifest chunk, loader" => Some(Self::ManifestChunkLoader),
            _ => None,
        }
    }
}

/// Identifies one module record: source path plus a kind tag.
///
/// Rendered as `path (tag)` on the wire; a bare path parses as an
/// [`ModuleKind::Ecmascript`] module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
    path: String,
    kind: ModuleKind,
}

impl ModuleId {
    pub fn new(path: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Shorthand for the common case.
    pub fn ecmascript(path: impl Into<String>) -> Self {
        Self::new(path, ModuleKind::Ecmascript)
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    /// Parse the `path (tag)` wire form.
    ///
    /// A missing tag means an ordinary module; an unrecognized tag is an
    /// error (the tag set is closed).
    pub fn parse(s: &str) -> Result<Self, String> {
        if let Some((path, rest)) = s.rsplit_once(" (")
            && let Some(tag) = rest.strip_suffix(')')
        {
            return match ModuleKind::from_tag(tag) {
                Some(kind) => Ok(Self::new(path, kind)),
                None => Err(format!("unknown module kind tag `{tag}` in `{s}`")),
            };
        }
        Ok(Self::ecmascript(s))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.kind.tag())
    }
}

impl Serialize for ModuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_round_trip() {
        let id = ChunkId::new("pages-a-b-js");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""pages-a-b-js""#);
        assert_eq!(serde_json::from_str::<ChunkId>(&json).unwrap(), id);
    }

    #[test]
    fn module_id_display_and_parse() {
        let id = ModuleId::new("src/pages/a.js", ModuleKind::ManifestChunk);
        let rendered = id.to_string();
        assert_eq!(rendered, "src/pages/a.js (manifest chunk)");
        assert_eq!(ModuleId::parse(&rendered).unwrap(), id);
    }

    #[test]
    fn bare_path_parses_as_ecmascript() {
        let id = ModuleId::parse("src/pages/a.js").unwrap();
        assert_eq!(id.kind(), ModuleKind::Ecmascript);
        assert_eq!(id.path(), "src/pages/a.js");
    }

    #[test]
    fn loader_tag_round_trips() {
        let id = ModuleId::new("src/big.js", ModuleKind::ManifestChunkLoader);
        assert_eq!(ModuleId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn unknown_tag_rejected() {
        assert!(ModuleId::parse("src/a.js (wasm)").is_err());
    }
}
