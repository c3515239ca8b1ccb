/// W-30 catalog
///
/// W-30 disks follow the S-550 layout closely, but some test disks decode
/// inconsistently, so parsing is refused until the differences are known.

use super::{CatalogParser, ParsedCatalog};
use crate::error::{DiskError, Result};
use crate::format::FormatKind;
use crate::image::ByteReader;

/// Catalog parser stub for W-30 disks
#[derive(Debug, Clone, Copy, Default)]
pub struct W30Catalog;

impl CatalogParser for W30Catalog {
    fn format(&self) -> FormatKind {
        FormatKind::W30
    }

    fn parse(&self, _reader: &ByteReader<'_>) -> Result<ParsedCatalog> {
        Err(DiskError::FormatNotYetSupported(self.format()))
    }
}
