use std::collections::HashMap;

use imf_types::{AssetId, AssetLocator};
use serde::Serialize;

use crate::error::{AssetMapError, AssetMapResult};

/// Ordered map from asset ids to their resolved locations.
///
/// Entries keep Asset Map document order. The entry count is the length of
/// the owned entry list, so it cannot disagree with the entries. Ids are not
/// required to be unique; lookups return the first entry for an id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AssetRegistry {
    entries: Vec<AssetLocator>,
    #[serde(skip)]
    index: HashMap<AssetId, usize>,
}

impl AssetRegistry {
    /// Number of entries (one per `Asset` element).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in document order.
    pub fn entries(&self) -> &[AssetLocator] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetLocator> {
        self.entries.iter()
    }

    /// First entry for `id`.
    pub fn get(&self, id: &AssetId) -> Option<&AssetLocator> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.index.contains_key(id)
    }

    /// Like [`get`](Self::get) but reports a missing id as an error.
    pub fn locate(&self, id: &AssetId) -> AssetMapResult<&AssetLocator> {
        self.get(id).ok_or(AssetMapError::AssetNotFound(*id))
    }

    /// Locate every id, failing on the first one that is not listed.
    pub fn locate_all<'a, I>(&self, ids: I) -> AssetMapResult<Vec<&AssetLocator>>
    where
        I: IntoIterator<Item = &'a AssetId>,
    {
        ids.into_iter().map(|id| self.locate(id)).collect()
    }

    /// Ids listed more than once, in order of first appearance.
    pub fn duplicates(&self) -> Vec<AssetId> {
        let mut seen: HashMap<AssetId, usize> = HashMap::new();
        let mut dups = Vec::new();
        for entry in &self.entries {
            let count = seen.entry(*entry.id()).or_insert(0);
            *count += 1;
            if *count == 2 {
                dups.push(*entry.id());
            }
        }
        dups
    }

    /// Free the registry and all of its entries.
    ///
    /// Takes the registry by value, so a released registry cannot be used or
    /// released again.
    pub fn release(self) {
        drop(self);
    }
}

impl<'a> IntoIterator for &'a AssetRegistry {
    type Item = &'a AssetLocator;
    type IntoIter = std::slice::Iter<'a, AssetLocator>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for AssetRegistry {
    type Item = AssetLocator;
    type IntoIter = std::vec::IntoIter<AssetLocator>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Release a registry that may be absent. `None` is a no-op.
pub fn release(registry: Option<AssetRegistry>) {
    if let Some(registry) = registry {
        registry.release();
    }
}

/// Owns the entries of a registry while it is being populated.
///
/// Dropping the builder frees every appended entry; only
/// [`finish`](Self::finish) hands them over as an [`AssetRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<AssetLocator>,
    index: HashMap<AssetId, usize>,
}

impl RegistryBuilder {
    /// An empty registry under construction.
    pub fn allocate() -> Self {
        Self::default()
    }

    /// Append one entry.
    ///
    /// Growth is amortized; if it fails the builder is left unchanged and
    /// [`AssetMapError::Allocation`] is returned.
    pub fn append(&mut self, locator: AssetLocator) -> AssetMapResult<()> {
        let entries = self.entries.len();
        self.entries
            .try_reserve(1)
            .map_err(|_| AssetMapError::Allocation { entries })?;
        if !self.index.contains_key(locator.id()) {
            self.index
                .try_reserve(1)
                .map_err(|_| AssetMapError::Allocation { entries })?;
            self.index.insert(*locator.id(), entries);
        }
        self.entries.push(locator);
        Ok(())
    }

    /// Whether an entry with `id` was already appended.
    pub fn contains(&self, id: &AssetId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Commit the entries.
    pub fn finish(self) -> AssetRegistry {
        AssetRegistry {
            entries: self.entries,
            index: self.index,
        }
    }
}
