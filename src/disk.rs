/// Opened sampler disk: image, format and catalog together
///
/// Construction runs the whole pipeline (load, identify, parse). A
/// `DiskCatalog` only exists once every step has succeeded.

use crate::catalog::{parser_for, CatalogEntry, PatchEntry, VolumeMetadata};
use crate::error::{DiskError, Result};
use crate::extract::{extract, ExtractOptions, SamplePayload};
use crate::format::{identify, CatalogLayout, FormatKind};
use crate::image::DiskImage;
use std::path::Path;

/// Read-only catalog of an opened disk image
#[derive(Debug, Clone)]
pub struct DiskCatalog {
    image: DiskImage,
    format: FormatKind,
    entries: Vec<CatalogEntry>,
    patches: Vec<PatchEntry>,
    volume: VolumeMetadata,
}

impl DiskCatalog {
    /// Open and catalog an image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_image(DiskImage::open(path)?)
    }

    /// Catalog an in-memory image buffer
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_image(DiskImage::from_bytes(data))
    }

    /// Catalog a loaded image
    pub fn from_image(image: DiskImage) -> Result<Self> {
        let reader = image.reader();
        let format = identify(&reader)?;
        let parsed = parser_for(format).parse(&reader)?;

        Ok(Self {
            format,
            entries: parsed.entries,
            patches: parsed.patches,
            volume: parsed.volume,
            image,
        })
    }

    /// Identify an image file without parsing its catalog
    pub fn identify_file<P: AsRef<Path>>(path: P) -> Result<FormatKind> {
        let image = DiskImage::open(path)?;
        identify(&image.reader())
    }

    /// Disk format
    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Layout table used to read this disk
    pub fn layout(&self) -> &'static CatalogLayout {
        self.format.layout()
    }

    /// Underlying image
    pub fn image(&self) -> &DiskImage {
        &self.image
    }

    /// Number of tone slots, valid or not
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Tone slot by index
    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// All tone slots in on-disk order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Tone slots that passed validation, in on-disk order
    pub fn valid_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_valid())
    }

    /// Find a tone by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Patch slots in on-disk order
    pub fn patches(&self) -> &[PatchEntry] {
        &self.patches
    }

    /// Image level metadata
    pub fn volume(&self) -> &VolumeMetadata {
        &self.volume
    }

    /// Extract a tone's payload with default options
    pub fn extract(&self, index: usize) -> Result<SamplePayload> {
        self.extract_with(index, &ExtractOptions::default())
    }

    /// Extract a tone's payload
    pub fn extract_with(&self, index: usize, options: &ExtractOptions) -> Result<SamplePayload> {
        let entry = self.entry(index).ok_or(DiskError::EntryNotFound(index))?;
        extract(&self.image.reader(), entry, options)
    }

    /// Extract a tone and write it as a WAV file
    pub fn export_wav<P: AsRef<Path>>(
        &self,
        index: usize,
        path: P,
        options: &ExtractOptions,
    ) -> Result<SamplePayload> {
        let payload = self.extract_with(index, options)?;
        payload.save_wav(path)?;
        Ok(payload)
    }
}
