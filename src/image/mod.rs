/// Sampler disk image container

/// Bounds-checked byte reader
pub mod reader;

pub use reader::ByteReader;

use crate::error::{DiskError, Result};
use crate::format::constants::{IMAGE_SIZE, MAX_IMAGE_FILE_SIZE};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Raw floppy image held entirely in memory
///
/// The buffer is never modified after loading.
#[derive(Debug, Clone)]
pub struct DiskImage {
    data: Vec<u8>,
    filename: Option<String>,
}

impl DiskImage {
    /// Read a whole image file into memory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let filename = path
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());

        let mut file = File::open(&path)?;

        // Check file size before reading anything
        let size = file.metadata()?.len();
        if size > MAX_IMAGE_FILE_SIZE as u64 {
            return Err(DiskError::FileTooLarge {
                size,
                max: MAX_IMAGE_FILE_SIZE as u64,
            });
        }

        let mut data = Vec::with_capacity(size as usize);
        file.read_to_end(&mut data)?;
        log::debug!("Read {} bytes from {}", data.len(), path.as_ref().display());

        let mut image = Self::from_bytes(data);
        image.filename = filename;
        Ok(image)
    }

    /// Wrap an in-memory buffer
    pub fn from_bytes(data: Vec<u8>) -> Self {
        if data.len() != IMAGE_SIZE {
            log::warn!(
                "Unexpected disk image size: {} bytes (expected {})",
                data.len(),
                IMAGE_SIZE
            );
        }
        Self {
            data,
            filename: None,
        }
    }

    /// Get the original filename if loaded from disk
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Raw image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Image size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Is the image empty?
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Does the image have the nominal 720 KB size?
    pub fn has_nominal_size(&self) -> bool {
        self.data.len() == IMAGE_SIZE
    }

    /// Reader over the whole image
    pub fn reader(&self) -> ByteReader<'_> {
        ByteReader::new(&self.data)
    }
}
