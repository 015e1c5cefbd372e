//! Chunk group encoding.
//!
//! A chunk group is the ordered list of chunks that must all be resolved
//! before a target module can be imported. On the wire each entry is either a
//! bare chunk id string (leaf chunk) or an object
//! `{"path": "<ChunkId>", "included": ["<ModuleId>", ...]}` for a chunk with
//! an embedded module listing (used for manifest-chunk resolution).

use serde::{Deserialize, Serialize};

use super::{ChunkId, ModuleId};

// =============================================================================
// GroupEntry
// =============================================================================

/// One entry of a chunk group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupEntry {
    /// Leaf chunk, encoded as a bare string.
    Chunk(ChunkId),
    /// Chunk with an embedded module listing.
    WithModules {
        path: ChunkId,
        included: Vec<ModuleId>,
    },
}

impl GroupEntry {
    /// The chunk this entry names, regardless of shape.
    #[inline]
    pub fn chunk_id(&self) -> &ChunkId {
        match self {
            Self::Chunk(id) => id,
            Self::WithModules { path, .. } => path,
        }
    }

    /// Modules embedded in this chunk (empty for leaf entries).
    #[inline]
    pub fn included(&self) -> &[ModuleId] {
        match self {
            Self::Chunk(_) => &[],
            Self::WithModules { included, .. } => included,
        }
    }
}

impl From<ChunkId> for GroupEntry {
    fn from(id: ChunkId) -> Self {
        Self::Chunk(id)
    }
}

// =============================================================================
// ChunkGroup
// =============================================================================

/// Ordered list of chunks an entry point needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkGroup(Vec<GroupEntry>);

impl ChunkGroup {
    pub fn new(entries: Vec<GroupEntry>) -> Self {
        Self(entries)
    }

    #[inline]
    pub fn entries(&self) -> &[GroupEntry] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the chunk ids in order.
    pub fn chunk_ids(&self) -> impl Iterator<Item = &ChunkId> {
        self.0.iter().map(GroupEntry::chunk_id)
    }
}

impl FromIterator<GroupEntry> for ChunkGroup {
    fn from_iter<I: IntoIterator<Item = GroupEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ChunkGroup {
    type Item = &'a GroupEntry;
    type IntoIter = std::slice::Iter<'a, GroupEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ModuleKind;

    #[test]
    fn bare_string_entry_decodes_as_leaf() {
        let group: ChunkGroup = serde_json::from_str(r#"["pages-a-js"]"#).unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.entries()[0], GroupEntry::Chunk(ChunkId::new("pages-a-js")));
        assert!(group.entries()[0].included().is_empty());
    }

    #[test]
    fn object_entry_carries_module_listing() {
        let json = r#"[{"path": "manifest-big-js", "included": ["src/big.js (manifest chunk)"]}]"#;
        let group: ChunkGroup = serde_json::from_str(json).unwrap();

        let entry = &group.entries()[0];
        assert_eq!(entry.chunk_id().as_str(), "manifest-big-js");
        assert_eq!(entry.included().len(), 1);
        assert_eq!(entry.included()[0].kind(), ModuleKind::ManifestChunk);
    }

    #[test]
    fn mixed_group_preserves_order() {
        let json = r#"["a", {"path": "b", "included": []}, "c"]"#;
        let group: ChunkGroup = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = group.chunk_ids().map(ChunkId::as_str).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn leaf_entry_encodes_as_bare_string() {
        let group = ChunkGroup::new(vec![GroupEntry::Chunk(ChunkId::new("a"))]);
        assert_eq!(serde_json::to_string(&group).unwrap(), r#"["a"]"#);
    }
}
