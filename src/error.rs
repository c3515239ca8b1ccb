use thiserror::Error;

use crate::catalog::InvalidReason;
use crate::format::FormatKind;

/// Result type alias for sampler disk operations
pub type Result<T> = std::result::Result<T, DiskError>;

/// Errors that can occur when reading sampler disk images
#[derive(Debug, Error)]
pub enum DiskError {
    /// I/O error occurred while reading the image file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image file is larger than any supported disk
    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge {
        /// Size of the file in bytes
        size: u64,
        /// Maximum accepted size
        max: u64,
    },

    /// Read outside the image buffer
    #[error("Read out of bounds: {length} bytes at offset {offset} (image size: {size})")]
    OutOfBounds {
        /// Requested start offset
        offset: usize,
        /// Requested length
        length: usize,
        /// Size of the underlying buffer
        size: usize,
    },

    /// Image is not any known sampler disk format
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),

    /// Image was identified but its catalog can't be read yet
    #[error("{0} disks are recognized but not yet supported")]
    FormatNotYetSupported(FormatKind),

    /// Directory structure itself is unreadable
    #[error("Corrupt catalog: {0}")]
    CorruptCatalog(String),

    /// Payload extent runs past the end of the image
    #[error("Truncated payload for tone {index}: needs {end} bytes, image has {size}")]
    TruncatedPayload {
        /// Tone slot index
        index: usize,
        /// End offset of the payload
        end: usize,
        /// Size of the image
        size: usize,
    },

    /// Payload stored in a physical layout the extractor doesn't handle
    #[error("Unsupported payload layout for tone {0}: fragmented storage")]
    UnsupportedPayloadLayout(usize),

    /// Extraction attempted on an entry that failed validation
    #[error("Tone {index} is not extractable: {reason}")]
    InvalidEntry {
        /// Tone slot index
        index: usize,
        /// Why the entry was flagged
        reason: InvalidReason,
    },

    /// No catalog entry at the requested index
    #[error("No tone at index {0}")]
    EntryNotFound(usize),
}

impl DiskError {
    /// Create a corrupt catalog error
    pub fn corrupt<S: Into<String>>(message: S) -> Self {
        DiskError::CorruptCatalog(message.into())
    }

    /// Create an unrecognized format error
    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        DiskError::UnrecognizedFormat(message.into())
    }

    /// Does this error prevent the whole image from being opened?
    ///
    /// Extraction errors only affect a single tone and are not fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DiskError::Io(_)
                | DiskError::FileTooLarge { .. }
                | DiskError::UnrecognizedFormat(_)
                | DiskError::FormatNotYetSupported(_)
                | DiskError::CorruptCatalog(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DiskError::OutOfBounds {
            offset: 737_000,
            length: 512,
            size: 737_280,
        };
        assert_eq!(
            err.to_string(),
            "Read out of bounds: 512 bytes at offset 737000 (image size: 737280)"
        );
    }

    #[test]
    fn test_not_yet_supported_display() {
        let err = DiskError::FormatNotYetSupported(FormatKind::S50);
        assert_eq!(err.to_string(), "S-50 disks are recognized but not yet supported");
    }

    #[test]
    fn test_fatal_classes() {
        assert!(DiskError::invalid_format("nope").is_fatal());
        assert!(DiskError::corrupt("tone table").is_fatal());
        assert!(DiskError::FormatNotYetSupported(FormatKind::W30).is_fatal());
        assert!(!DiskError::UnsupportedPayloadLayout(3).is_fatal());
        assert!(!DiskError::TruncatedPayload {
            index: 0,
            end: 10,
            size: 5
        }
        .is_fatal());
        assert!(!DiskError::EntryNotFound(40).is_fatal());
    }
}
