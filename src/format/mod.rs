/// Sampler disk format identification

/// Geometry and offsets
pub mod constants;
/// Per-variant catalog layouts
pub mod layout;

pub use constants::*;
pub use layout::{CatalogLayout, PatchFields, StorageLayout, ToneFields};

use crate::error::{DiskError, Result};
use crate::image::ByteReader;

/// Disk format variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// S-550 and S-330 disks
    S550,
    /// S-50 disks, and S-550 disks converted for the S-50 (S-51)
    S50,
    /// W-30 disks
    W30,
}

impl FormatKind {
    /// All known variants
    pub const ALL: [FormatKind; 3] = [FormatKind::S550, FormatKind::S50, FormatKind::W30];

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            FormatKind::S550 => "S-550",
            FormatKind::S50 => "S-50",
            FormatKind::W30 => "W-30",
        }
    }

    /// Signatures found at bytes 4..8 of the system area
    pub fn signatures(&self) -> &'static [&'static [u8; SIGNATURE_LEN]] {
        match self {
            FormatKind::S550 => &[b"S550", b"S330"],
            FormatKind::S50 => &[b"S-50", b"S-51"],
            FormatKind::W30 => &[b"W-30"],
        }
    }

    /// Can this variant's catalog be fully read?
    pub fn is_fully_supported(&self) -> bool {
        matches!(self, FormatKind::S550)
    }

    /// Catalog layout table for this variant
    pub fn layout(&self) -> &'static CatalogLayout {
        match self {
            FormatKind::S550 => &layout::S550_LAYOUT,
            FormatKind::S50 => &layout::S50_LAYOUT,
            FormatKind::W30 => &layout::W30_LAYOUT,
        }
    }

    /// Look up a variant by its signature bytes
    pub fn from_signature(signature: &[u8]) -> Option<FormatKind> {
        FormatKind::ALL.into_iter().find(|kind| {
            kind.signatures()
                .iter()
                .any(|sig| sig.as_slice() == signature)
        })
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identify the disk format from its signature
///
/// Anything that doesn't match a known signature, including buffers too
/// short to hold the catalog, is `UnrecognizedFormat`.
pub fn identify(reader: &ByteReader<'_>) -> Result<FormatKind> {
    if reader.len() < WAVE_OFFSET {
        return Err(DiskError::invalid_format(format!(
            "image is {} bytes, too small for a sampler disk",
            reader.len()
        )));
    }

    let signature = reader
        .read(SIGNATURE_OFFSET, SIGNATURE_LEN)
        .map_err(|_| DiskError::invalid_format("no format signature"))?;

    match FormatKind::from_signature(signature) {
        Some(kind) => {
            log::debug!("Identified {} disk", kind);
            Ok(kind)
        }
        None => Err(DiskError::invalid_format(format!(
            "unknown disk format '{}'",
            signature.escape_ascii()
        ))),
    }
}
