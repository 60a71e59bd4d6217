//! Directory kinds and their declared fallbacks.

use std::fmt;

/// Camera vendors whose maker notes get a directory of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Vendor {
    Canon,
    Fuji,
    Minolta,
    Nikon,
    Olympus,
    Panasonic,
    Pentax,
    Sony,
    /// Maker notes whose vendor could not be determined.
    Unknown,
}

impl Vendor {
    /// Guess the vendor from the EXIF `Make` string.
    pub fn from_make(make: &str) -> Option<Self> {
        let make = make.trim().to_ascii_uppercase();
        let vendor = if make.starts_with("CANON") {
            Vendor::Canon
        } else if make.starts_with("FUJI") {
            Vendor::Fuji
        } else if make.starts_with("MINOLTA") || make.starts_with("KONICA MINOLTA") {
            Vendor::Minolta
        } else if make.starts_with("NIKON") {
            Vendor::Nikon
        } else if make.starts_with("OLYMPUS") || make.starts_with("OM DIGITAL") {
            Vendor::Olympus
        } else if make.starts_with("PANASONIC") || make.starts_with("LEICA") {
            Vendor::Panasonic
        } else if make.starts_with("PENTAX")
            || make.starts_with("ASAHI")
            || make.starts_with("RICOH")
            || make.starts_with("SAMSUNG")
        {
            Vendor::Pentax
        } else if make.starts_with("SONY") {
            Vendor::Sony
        } else {
            return None;
        };
        Some(vendor)
    }
}

/// Identifies one logical metadata directory. A container holds at most one directory per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryKind {
    /// TIFF IFD0 and any following IFDs merged into it.
    Tiff,
    /// EXIF: IFD0 of an EXIF segment plus the EXIF sub-IFD.
    Exif,
    /// The EXIF sub-IFD kept apart from IFD0, as written into JPEG files.
    SubExif,
    /// The GPS sub-IFD.
    Gps,
    /// The interoperability sub-IFD.
    Interop,
    /// Directories reached through TIFF `SubIFDs`.
    SubIfd,
    /// DNG additions to IFD0.
    Dng,
    /// IPTC IIM datasets.
    Iptc,
    /// Canon CRW heap records.
    Ciff,
    /// Synthesized directory holding the resolved value of each capability.
    Core,
    /// Vendor maker notes.
    MakerNotes(Vendor),
}

impl DirectoryKind {
    /// The kind consulted when a lookup or removal misses this directory.
    pub fn fallback(&self) -> Option<DirectoryKind> {
        match self {
            DirectoryKind::SubExif => Some(DirectoryKind::Exif),
            DirectoryKind::Dng => Some(DirectoryKind::Tiff),
            _ => None,
        }
    }

    /// Whether this is a maker-note directory.
    pub fn is_maker_notes(&self) -> bool {
        matches!(self, DirectoryKind::MakerNotes(_))
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            DirectoryKind::Tiff => "TIFF",
            DirectoryKind::Exif => "EXIF",
            DirectoryKind::SubExif => "SubEXIF",
            DirectoryKind::Gps => "GPS",
            DirectoryKind::Interop => "Interoperability",
            DirectoryKind::SubIfd => "SubIFD",
            DirectoryKind::Dng => "DNG",
            DirectoryKind::Iptc => "IPTC",
            DirectoryKind::Ciff => "CIFF",
            DirectoryKind::Core => "Core",
            DirectoryKind::MakerNotes(Vendor::Canon) => "Canon",
            DirectoryKind::MakerNotes(Vendor::Fuji) => "Fuji",
            DirectoryKind::MakerNotes(Vendor::Minolta) => "Minolta",
            DirectoryKind::MakerNotes(Vendor::Nikon) => "Nikon",
            DirectoryKind::MakerNotes(Vendor::Olympus) => "Olympus",
            DirectoryKind::MakerNotes(Vendor::Panasonic) => "Panasonic",
            DirectoryKind::MakerNotes(Vendor::Pentax) => "Pentax",
            DirectoryKind::MakerNotes(Vendor::Sony) => "Sony",
            DirectoryKind::MakerNotes(Vendor::Unknown) => "MakerNotes",
        }
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fallbacks() {
        assert_eq!(DirectoryKind::SubExif.fallback(), Some(DirectoryKind::Exif));
        assert_eq!(DirectoryKind::Dng.fallback(), Some(DirectoryKind::Tiff));
        assert_eq!(DirectoryKind::Exif.fallback(), None);
        assert_eq!(DirectoryKind::MakerNotes(Vendor::Nikon).fallback(), None);
    }

    #[test]
    fn test_vendor_from_make() {
        assert_eq!(Vendor::from_make("Canon"), Some(Vendor::Canon));
        assert_eq!(Vendor::from_make("NIKON CORPORATION"), Some(Vendor::Nikon));
        assert_eq!(Vendor::from_make(" OLYMPUS IMAGING CORP.  "), Some(Vendor::Olympus));
        assert_eq!(Vendor::from_make("KONICA MINOLTA"), Some(Vendor::Minolta));
        assert_eq!(Vendor::from_make("Acme"), None);
    }
}
