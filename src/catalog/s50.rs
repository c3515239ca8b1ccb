/// S-50 catalog
///
/// S-50 disks share the S-550 block offsets but use 8 patches of 512
/// bytes and a different tone parameter set. S-51 disks are S-550 disks
/// converted for the S-50 and use the same layout.
///
/// The layout table in `format::layout::S50_LAYOUT` is provisional (the
/// wave offset is unconfirmed), so parsing is refused for now.

use super::{CatalogParser, ParsedCatalog};
use crate::error::{DiskError, Result};
use crate::format::FormatKind;
use crate::image::ByteReader;

/// Catalog parser stub for S-50 disks
#[derive(Debug, Clone, Copy, Default)]
pub struct S50Catalog;

impl CatalogParser for S50Catalog {
    fn format(&self) -> FormatKind {
        FormatKind::S50
    }

    fn parse(&self, _reader: &ByteReader<'_>) -> Result<ParsedCatalog> {
        Err(DiskError::FormatNotYetSupported(self.format()))
    }
}
