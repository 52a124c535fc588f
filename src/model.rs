// Domain types shared by the resolver, the album directory and the mutator.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier the server assigns to an imported file. Opaque to us.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        AssetId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        AssetId(s.to_string())
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        AssetId(s)
    }
}

/// A set of asset IDs that remembers insertion order.
///
/// Order only makes output stable; two sets holding the same IDs compare
/// equal regardless of the order they were built in.
#[derive(Debug, Clone, Default)]
pub struct AssetIdSet {
    order: Vec<AssetId>,
    seen: HashSet<AssetId>,
}

impl AssetIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the ID was already present.
    pub fn insert(&mut self, id: AssetId) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetId> {
        self.order.iter()
    }

    /// Split into slices of at most `size` IDs, in insertion order.
    pub fn chunks(&self, size: usize) -> std::slice::Chunks<'_, AssetId> {
        self.order.chunks(size.max(1))
    }

    pub fn as_slice(&self) -> &[AssetId] {
        &self.order
    }
}

impl PartialEq for AssetIdSet {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl Eq for AssetIdSet {}

impl Extend<AssetId> for AssetIdSet {
    fn extend<I: IntoIterator<Item = AssetId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl FromIterator<AssetId> for AssetIdSet {
    fn from_iter<I: IntoIterator<Item = AssetId>>(iter: I) -> Self {
        let mut set = AssetIdSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a AssetIdSet {
    type Item = &'a AssetId;
    type IntoIter = std::slice::Iter<'a, AssetId>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// An album as listed by `GET /api/albums`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub album_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_count: Option<u64>,
}

/// The album chosen by the user: one that exists, or a name to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumTarget {
    Existing(Album),
    New { name: String },
}

impl AlbumTarget {
    pub fn name(&self) -> &str {
        match self {
            AlbumTarget::Existing(album) => &album.album_name,
            AlbumTarget::New { name } => name,
        }
    }
}

/// Outcome of adding a set of assets to an album.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationResult {
    pub added: usize,
    pub already_present: usize,
    pub failed: AssetIdSet,
    /// Counts are hypothetical; nothing was sent.
    pub dry_run: bool,
}

impl MutationResult {
    pub fn total(&self) -> usize {
        self.added + self.already_present + self.failed.len()
    }
}
