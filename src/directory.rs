//! One logical metadata directory: a tag → value map for a single [`DirectoryKind`].

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::capability::{self, Capability};
use crate::catalog::{self, TagCatalog};
use crate::error::MetadataResult;
use crate::kind::DirectoryKind;
use crate::tiff::tags::TagId;
use crate::value::{MetadataValue, ValueData};

/// Kind-keyed directory lookup, used to follow fallback kinds.
pub trait DirectoryRegistry {
    /// The directory of `kind`, if one exists.
    fn directory(&self, kind: DirectoryKind) -> Option<Arc<MetadataDirectory>>;
}

/// A registry with no directories, for lookups that should not follow fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl DirectoryRegistry for NoFallback {
    fn directory(&self, _kind: DirectoryKind) -> Option<Arc<MetadataDirectory>> {
        None
    }
}

/// Tag → value map for one directory kind.
///
/// Values are stored behind [`Arc`] so that cloned directories share them until one side edits;
/// [`set`][Self::set] goes through [`Arc::make_mut`], which copies a shared value first.
#[derive(Debug)]
pub struct MetadataDirectory {
    kind: DirectoryKind,
    entries: RwLock<BTreeMap<TagId, Arc<MetadataValue>>>,
}

impl MetadataDirectory {
    /// An empty directory.
    pub fn new(kind: DirectoryKind) -> Self {
        Self {
            kind,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<TagId, Arc<MetadataValue>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<TagId, Arc<MetadataValue>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The kind of this directory.
    pub fn kind(&self) -> DirectoryKind {
        self.kind
    }

    /// The catalog describing this directory's tags.
    pub fn catalog(&self) -> &'static TagCatalog {
        catalog::catalog_for(self.kind)
    }

    /// Display name of `tag`.
    pub fn tag_name(&self, tag: TagId) -> String {
        catalog::tag_name(self.kind, tag)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the directory holds no values.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Whether `tag` is present in this directory itself.
    pub fn contains(&self, tag: TagId) -> bool {
        self.read().contains_key(&tag)
    }

    /// Snapshot of the entries in ascending tag order.
    pub fn entries(&self) -> Vec<(TagId, Arc<MetadataValue>)> {
        self.read()
            .iter()
            .map(|(tag, value)| (*tag, value.clone()))
            .collect()
    }

    /// Tags present, ascending.
    pub fn tags(&self) -> Vec<TagId> {
        self.read().keys().copied().collect()
    }

    /// The value of `tag` in this directory only.
    pub fn get_local(&self, tag: TagId) -> Option<Arc<MetadataValue>> {
        self.read().get(&tag).cloned()
    }

    /// The value of `tag`, following the fallback chain on a miss.
    pub fn get(
        &self,
        tag: TagId,
        registry: &(impl DirectoryRegistry + ?Sized),
    ) -> Option<Arc<MetadataValue>> {
        if let Some(value) = self.get_local(tag) {
            return Some(value);
        }
        let mut seen = HashSet::from([self.kind]);
        let mut next = self.kind.fallback();
        while let Some(kind) = next {
            if !seen.insert(kind) {
                break;
            }
            let Some(dir) = registry.directory(kind) else {
                next = kind.fallback();
                continue;
            };
            if let Some(value) = dir.get_local(tag) {
                return Some(value);
            }
            next = kind.fallback();
        }
        None
    }

    /// Remove `tag` from this directory only.
    pub fn remove_local(&self, tag: TagId) -> Option<Arc<MetadataValue>> {
        self.write().remove(&tag)
    }

    /// Remove `tag`, following the fallback chain if this directory doesn't hold it.
    pub fn remove(
        &self,
        tag: TagId,
        registry: &(impl DirectoryRegistry + ?Sized),
    ) -> Option<Arc<MetadataValue>> {
        if let Some(value) = self.remove_local(tag) {
            return Some(value);
        }
        let mut seen = HashSet::from([self.kind]);
        let mut next = self.kind.fallback();
        while let Some(kind) = next {
            if !seen.insert(kind) {
                break;
            }
            if let Some(value) = registry.directory(kind).and_then(|d| d.remove_local(tag)) {
                return Some(value);
            }
            next = kind.fallback();
        }
        None
    }

    /// Store `value` under `tag`, returning the value it replaced.
    ///
    /// An empty string is treated as absence: the tag is removed instead.
    pub fn put(&self, tag: TagId, value: MetadataValue) -> Option<Arc<MetadataValue>> {
        self.put_shared(tag, Arc::new(value))
    }

    /// Like [`put`][Self::put] for a value that may be shared with another directory.
    ///
    /// A value already stamped with this directory's kind and `tag` is stored as is; anything else
    /// is restamped, copying it first if shared.
    pub fn put_shared(
        &self,
        tag: TagId,
        mut value: Arc<MetadataValue>,
    ) -> Option<Arc<MetadataValue>> {
        if value.is_empty_string() {
            return self.remove_local(tag);
        }
        if value.owner() != Some(self.kind) || value.tag() != Some(tag) {
            let editable = self.catalog().is_editable(tag);
            Arc::make_mut(&mut value).stamp(self.kind, tag, editable);
        }
        self.write().insert(tag, value)
    }

    /// Replace the payload of `tag` in place, marking it edited.
    ///
    /// Returns `false` if the tag is absent. A value shared with a clone of this directory is
    /// copied before it is changed. Setting an empty string removes the tag.
    pub fn set(&self, tag: TagId, data: ValueData) -> MetadataResult<bool> {
        let mut entries = self.write();
        let Some(value) = entries.get_mut(&tag) else {
            return Ok(false);
        };
        Arc::make_mut(value).set(data)?;
        if value.is_empty_string() {
            entries.remove(&tag);
        }
        Ok(true)
    }

    /// Split a packed record into one value per element.
    ///
    /// Element `i` (from `start` on) is stored under `(tag << 8) + i`. The record itself is kept
    /// under `tag` but hidden from display. Opaque records are read as big-endian 32-bit words and
    /// negative words are skipped; integer records become `SShort` values, or `SLong` if `wide`.
    pub fn explode(&self, tag: TagId, start: usize, value: MetadataValue, wide: bool) {
        let base = tag << 8;
        match value.data() {
            ValueData::Undefined(bytes) => {
                for (i, word) in bytes.chunks_exact(4).enumerate().skip(start) {
                    let n = i32::from_be_bytes([word[0], word[1], word[2], word[3]]);
                    if n >= 0 {
                        self.put(base + i as TagId, MetadataValue::ulong(n as u32));
                    }
                }
            }
            _ => {
                if let Some(items) = value.as_i64_vec() {
                    for (i, n) in items.into_iter().enumerate().skip(start) {
                        let sub = if wide {
                            MetadataValue::new(ValueData::SLong(vec![n as i32]))
                        } else {
                            MetadataValue::new(ValueData::SShort(vec![n as i16]))
                        };
                        if let Ok(sub) = sub {
                            self.put(base + i as TagId, sub);
                        }
                    }
                }
            }
        }
        let mut value = value;
        value.set_displayable(false);
        self.put(tag, value);
    }

    /// Put every value of `other` into this directory. Later writes win.
    pub fn merge_from(&self, other: &MetadataDirectory) {
        for (tag, value) in other.entries() {
            self.put_shared(tag, value);
        }
    }

    /// Move the values of `tags` present here into `to`.
    pub fn move_values(&self, to: &MetadataDirectory, tags: &[TagId]) {
        for tag in tags {
            if let Some(value) = self.remove_local(*tag) {
                to.put_shared(*tag, value);
            }
        }
    }

    /// Keep only the entries for which `keep` returns `true`.
    pub fn retain(&self, mut keep: impl FnMut(TagId, &MetadataValue) -> bool) {
        self.write().retain(|tag, value| keep(*tag, value));
    }

    /// Priority of this directory as a provider of `capability`; higher wins.
    pub fn priority(&self, capability: Capability) -> i32 {
        capability::priority(self.kind, capability)
    }

    /// A new directory sharing this one's values.
    pub fn shallow_clone(&self) -> MetadataDirectory {
        MetadataDirectory {
            kind: self.kind,
            entries: RwLock::new(self.read().clone()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tiff::tags::{ciff, exif, tiff};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Registry(HashMap<DirectoryKind, Arc<MetadataDirectory>>);

    impl DirectoryRegistry for Registry {
        fn directory(&self, kind: DirectoryKind) -> Option<Arc<MetadataDirectory>> {
            self.0.get(&kind).cloned()
        }
    }

    #[test]
    fn test_put_stamps_owner() {
        let dir = MetadataDirectory::new(DirectoryKind::Tiff);
        dir.put(tiff::ARTIST, MetadataValue::string("Jane"));
        let value = dir.get_local(tiff::ARTIST).unwrap();
        assert_eq!(value.owner(), Some(DirectoryKind::Tiff));
        assert_eq!(value.tag(), Some(tiff::ARTIST));
        assert!(value.is_editable());
        assert_eq!(dir.tag_name(tiff::ARTIST), "Artist");
    }

    #[test]
    fn test_empty_string_removes() {
        let dir = MetadataDirectory::new(DirectoryKind::Tiff);
        dir.put(tiff::ARTIST, MetadataValue::string("Jane"));
        dir.put(tiff::ARTIST, MetadataValue::string(""));
        assert!(!dir.contains(tiff::ARTIST));
        assert!(dir.is_empty());

        dir.put(tiff::COPYRIGHT, MetadataValue::string("Jane"));
        assert!(dir.set(tiff::COPYRIGHT, ValueData::String(vec![String::new()])).unwrap());
        assert!(!dir.contains(tiff::COPYRIGHT));
    }

    #[test]
    fn test_fallback_lookup_and_removal() {
        let exif_dir = Arc::new(MetadataDirectory::new(DirectoryKind::Exif));
        exif_dir.put(exif::FNUMBER, MetadataValue::urational(28, 10));
        let mut registry = Registry::default();
        registry.0.insert(DirectoryKind::Exif, exif_dir.clone());

        let sub = MetadataDirectory::new(DirectoryKind::SubExif);
        let found = sub.get(exif::FNUMBER, &registry).unwrap();
        assert_eq!(found.owner(), Some(DirectoryKind::Exif));
        assert!(sub.get(exif::FNUMBER, &NoFallback).is_none());

        assert!(sub.remove(exif::FNUMBER, &registry).is_some());
        assert!(!exif_dir.contains(exif::FNUMBER));
        assert!(sub.get(exif::FNUMBER, &registry).is_none());
    }

    #[test]
    fn test_copy_on_write_between_clones() {
        let dir = MetadataDirectory::new(DirectoryKind::Tiff);
        dir.put(tiff::ORIENTATION, MetadataValue::ushort(1));
        let copy = dir.shallow_clone();
        assert!(Arc::ptr_eq(
            &dir.get_local(tiff::ORIENTATION).unwrap(),
            &copy.get_local(tiff::ORIENTATION).unwrap()
        ));

        assert!(copy.set(tiff::ORIENTATION, ValueData::UShort(vec![6])).unwrap());
        assert_eq!(copy.get_local(tiff::ORIENTATION).unwrap().as_i64(), Some(6));
        assert_eq!(dir.get_local(tiff::ORIENTATION).unwrap().as_i64(), Some(1));
        assert!(!dir.get_local(tiff::ORIENTATION).unwrap().is_edited());
        assert!(!copy.set(tiff::ARTIST, ValueData::UShort(vec![1])).unwrap());
    }

    #[test]
    fn test_explode_integers() {
        let dir = MetadataDirectory::new(DirectoryKind::Ciff);
        let record = MetadataValue::new(ValueData::UShort(vec![10, 0xFFFF, 3, 100])).unwrap();
        dir.explode(ciff::CAMERA_SETTINGS, 1, record, false);

        assert!(!dir.get_local(ciff::CAMERA_SETTINGS).unwrap().is_displayable());
        let base = ciff::CAMERA_SETTINGS << 8;
        assert!(!dir.contains(base));
        assert_eq!(dir.get_local(base + 1).unwrap().as_i64(), Some(-1));
        assert_eq!(dir.get_local(base + 3).unwrap().as_i64(), Some(100));
    }

    #[test]
    #[rustfmt::skip]
    fn test_explode_words() {
        let dir = MetadataDirectory::new(DirectoryKind::MakerNotes(crate::kind::Vendor::Minolta));
        let blob = MetadataValue::undefined(vec![
            0x00, 0x00, 0x00, 0x07,
            0xFF, 0xFF, 0xFF, 0xFE,
            0x00, 0x00, 0x01, 0x00,
        ]).unwrap();
        dir.explode(0x0001, 0, blob, false);
        assert_eq!(dir.get_local(0x0100).unwrap().as_i64(), Some(7));
        assert!(!dir.contains(0x0101));
        assert_eq!(dir.get_local(0x0102).unwrap().as_i64(), Some(256));
    }

    #[test]
    fn test_move_and_merge() {
        let a = MetadataDirectory::new(DirectoryKind::Tiff);
        let b = MetadataDirectory::new(DirectoryKind::Exif);
        a.put(tiff::MAKE, MetadataValue::string("Acme"));
        a.put(tiff::MODEL, MetadataValue::string("One"));
        a.move_values(&b, &[tiff::MAKE, tiff::SOFTWARE]);
        assert!(!a.contains(tiff::MAKE));
        assert_eq!(b.get_local(tiff::MAKE).unwrap().owner(), Some(DirectoryKind::Exif));

        b.merge_from(&a);
        assert_eq!(b.len(), 2);
        assert_eq!(a.len(), 1);
    }
}
