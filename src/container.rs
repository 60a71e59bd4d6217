//! All the metadata of one image.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;

use crate::capability::{
    self, Capability, CapabilityValue, ImageOrientation, ResolutionUnit,
};
use crate::directory::{DirectoryRegistry, MetadataDirectory};
use crate::kind::DirectoryKind;
use crate::tiff::tags::{tiff, TagId};
use crate::value::MetadataValue;

/// The directories of one image, at most one per [`DirectoryKind`], in insertion order.
///
/// Capability accessors ask every directory that can answer, highest
/// [priority](MetadataDirectory::priority) first, and return the first real answer or the
/// capability's sentinel.
///
/// Cloning copies the directory structure but shares values until either side edits one.
#[derive(Debug, Default)]
pub struct MetadataContainer {
    directories: RwLock<Vec<Arc<MetadataDirectory>>>,
}

impl MetadataContainer {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<MetadataDirectory>>> {
        self.directories.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<MetadataDirectory>>> {
        self.directories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of directories.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the container has no directories.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the directories in insertion order.
    pub fn directories(&self) -> Vec<Arc<MetadataDirectory>> {
        self.read().clone()
    }

    /// Kinds present, in insertion order.
    pub fn kinds(&self) -> Vec<DirectoryKind> {
        self.read().iter().map(|d| d.kind()).collect()
    }

    /// The directory of `kind`, creating an empty one if absent.
    pub fn get_or_create(&self, kind: DirectoryKind) -> Arc<MetadataDirectory> {
        let mut directories = self.write();
        if let Some(dir) = directories.iter().find(|d| d.kind() == kind) {
            return dir.clone();
        }
        let dir = Arc::new(MetadataDirectory::new(kind));
        directories.push(dir.clone());
        dir
    }

    /// Add `dir`, replacing any directory of the same kind in place.
    pub fn insert_directory(&self, dir: MetadataDirectory) -> Arc<MetadataDirectory> {
        let dir = Arc::new(dir);
        let mut directories = self.write();
        match directories.iter_mut().find(|d| d.kind() == dir.kind()) {
            Some(slot) => *slot = dir.clone(),
            None => directories.push(dir.clone()),
        }
        dir
    }

    /// Remove and return the directory of `kind`.
    pub fn remove_directory(&self, kind: DirectoryKind) -> Option<Arc<MetadataDirectory>> {
        let mut directories = self.write();
        let idx = directories.iter().position(|d| d.kind() == kind)?;
        Some(directories.remove(idx))
    }

    /// The value of `tag` in the directory of `kind`, following fallbacks.
    pub fn get_value(&self, kind: DirectoryKind, tag: TagId) -> Option<Arc<MetadataValue>> {
        match self.directory(kind) {
            Some(dir) => dir.get(tag, self),
            // The kind is absent but its fallback may still answer.
            None => {
                let fallback = kind.fallback()?;
                self.get_value(fallback, tag)
            }
        }
    }

    /// Store `value` under `tag` in the directory of `kind`, creating the directory if needed.
    pub fn put_value(&self, kind: DirectoryKind, tag: TagId, value: MetadataValue) {
        self.get_or_create(kind).put(tag, value);
    }

    /// Directories able to answer `capability`, best first. Ties keep insertion order.
    pub fn providers_of(&self, capability: Capability) -> Vec<Arc<MetadataDirectory>> {
        let mut providers: Vec<_> = self
            .read()
            .iter()
            .filter(|d| capability::provides(d.kind(), capability))
            .cloned()
            .collect();
        providers.sort_by_key(|d| std::cmp::Reverse(d.priority(capability)));
        providers
    }

    /// The first provider's answer to `capability`, if any provider has one.
    pub fn resolve(&self, capability: Capability) -> Option<CapabilityValue> {
        self.providers_of(capability)
            .iter()
            .find_map(|dir| capability::try_capability(capability, dir, self))
    }

    fn resolve_f64(&self, capability: Capability) -> f64 {
        match self.resolve(capability) {
            Some(CapabilityValue::Float(f)) => f,
            Some(CapabilityValue::Integer(n)) => n as f64,
            _ => 0.0,
        }
    }

    fn resolve_i64(&self, capability: Capability) -> Option<i64> {
        match self.resolve(capability) {
            Some(CapabilityValue::Integer(n)) => Some(n),
            Some(CapabilityValue::Float(f)) => Some(f as i64),
            _ => None,
        }
    }

    fn resolve_text(&self, capability: Capability) -> Option<String> {
        match self.resolve(capability) {
            Some(CapabilityValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// F-number, or 0.
    pub fn aperture(&self) -> f64 {
        self.resolve_f64(Capability::Aperture)
    }

    /// Exposure time in seconds, or 0.
    pub fn shutter_speed(&self) -> f64 {
        self.resolve_f64(Capability::ShutterSpeed)
    }

    /// ISO speed, or 0.
    pub fn iso(&self) -> u32 {
        self.resolve_i64(Capability::Iso)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Focal length in millimeters, or 0.
    pub fn focal_length(&self) -> f64 {
        self.resolve_f64(Capability::FocalLength)
    }

    /// When the picture was taken.
    pub fn capture_date_time(&self) -> Option<NaiveDateTime> {
        match self.resolve(Capability::CaptureDateTime) {
            Some(CapabilityValue::Date(d)) => Some(d),
            _ => None,
        }
    }

    /// Orientation, or [`ImageOrientation::Unknown`].
    pub fn orientation(&self) -> ImageOrientation {
        match self.resolve(Capability::Orientation) {
            Some(CapabilityValue::Orientation(o)) => o,
            _ => ImageOrientation::Unknown,
        }
    }

    /// Star rating, or 0.
    pub fn rating(&self) -> u32 {
        self.resolve_i64(Capability::Rating)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    /// EXIF flash bits, or -1.
    pub fn flash(&self) -> i32 {
        self.resolve_i64(Capability::Flash)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(-1)
    }

    /// Artist.
    pub fn artist(&self) -> Option<String> {
        self.resolve_text(Capability::Artist)
    }

    /// Caption.
    pub fn caption(&self) -> Option<String> {
        self.resolve_text(Capability::Caption)
    }

    /// Copyright.
    pub fn copyright(&self) -> Option<String> {
        self.resolve_text(Capability::Copyright)
    }

    /// Title.
    pub fn title(&self) -> Option<String> {
        self.resolve_text(Capability::Title)
    }

    /// Lens name.
    pub fn lens(&self) -> Option<String> {
        self.resolve_text(Capability::Lens)
    }

    /// Camera maker.
    pub fn camera_make(&self) -> Option<String> {
        self.resolve_text(Capability::CameraMake)
    }

    /// Camera model.
    pub fn camera_model(&self) -> Option<String> {
        self.resolve_text(Capability::CameraModel)
    }

    /// Width in pixels, or 0.
    pub fn image_width(&self) -> u32 {
        self.resolve_i64(Capability::ImageWidth)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Height in pixels, or 0.
    pub fn image_height(&self) -> u32 {
        self.resolve_i64(Capability::ImageHeight)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Horizontal resolution, or 0.
    pub fn resolution(&self) -> f64 {
        self.resolve_f64(Capability::Resolution)
    }

    /// Unit of [`resolution`][Self::resolution].
    pub fn resolution_unit(&self) -> ResolutionUnit {
        match self.resolve(Capability::ResolutionUnit) {
            Some(CapabilityValue::Unit(u)) => u,
            _ => ResolutionUnit::None,
        }
    }

    /// Latitude and longitude in decimal degrees.
    pub fn gps(&self) -> Option<(f64, f64)> {
        match self.resolve(Capability::Gps) {
            Some(CapabilityValue::Location(lat, lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// White balance color temperature in kelvin, or 0.
    pub fn color_temperature(&self) -> u32 {
        self.resolve_i64(Capability::ColorTemperature)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Copy every directory of `other` into this container; values from `other` win.
    ///
    /// An orientation resolved from `other` is also written to both the EXIF and TIFF
    /// `Orientation` tags so that neither location contradicts it.
    pub fn merge(&self, other: &MetadataContainer) {
        for dir in other.directories() {
            self.get_or_create(dir.kind()).merge_from(&dir);
        }
        if let Some(value) = other.orientation().tiff_value() {
            self.put_value(DirectoryKind::Exif, tiff::ORIENTATION, MetadataValue::ushort(value));
            self.put_value(DirectoryKind::Tiff, tiff::ORIENTATION, MetadataValue::ushort(value));
        }
    }
}

impl Clone for MetadataContainer {
    fn clone(&self) -> Self {
        let directories = self
            .read()
            .iter()
            .map(|d| Arc::new(d.shallow_clone()))
            .collect();
        Self {
            directories: RwLock::new(directories),
        }
    }
}

impl DirectoryRegistry for MetadataContainer {
    fn directory(&self, kind: DirectoryKind) -> Option<Arc<MetadataDirectory>> {
        self.read().iter().find(|d| d.kind() == kind).cloned()
    }
}
