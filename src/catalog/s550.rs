/// S-550 / S-330 catalog
///
/// Disk layout:
/// - System program in the first 64,512 bytes
/// - 16 patches of 256 bytes at 64,512
/// - Function parameters (with the disk label) at 68,608
/// - 32 tones of 128 bytes at 69,120
/// - Wave data from 73,728: 2 banks of 18 segments, 18,432 bytes each
///
/// Tone wave data is always one contiguous run of segments.

use super::walk::parse_catalog;
use super::{CatalogParser, ParsedCatalog};
use crate::error::Result;
use crate::format::FormatKind;
use crate::image::ByteReader;

/// Full catalog parser for S-550 and S-330 disks
#[derive(Debug, Clone, Copy, Default)]
pub struct S550Catalog;

impl CatalogParser for S550Catalog {
    fn format(&self) -> FormatKind {
        FormatKind::S550
    }

    fn parse(&self, reader: &ByteReader<'_>) -> Result<ParsedCatalog> {
        parse_catalog(reader, self.format(), self.layout())
    }
}
