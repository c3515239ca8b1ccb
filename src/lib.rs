/*!
# samplerdisk

A Rust library for reading Roland sampler floppy disk images and pulling the
tones stored on them out as standalone audio.

## Features

- Identify S-550/S-330, S-50/S-51 and W-30 disks from their system signature
- Parse the S-550 catalog: tones, patches, disk label and system version
- Validate every tone slot and report why a slot is unusable
- Extract wave data, unpacking 12-bit samples to 16-bit PCM
- Write extracted tones as WAV files at their native sample rate
- Decode function and MIDI parameters and write a plain text disk report

## Quick Start

```rust,no_run
use samplerdisk::{DiskCatalog, ExtractOptions};

// Open and catalog an image
let catalog = DiskCatalog::open("disk.out")?;
println!("{} disk: {}", catalog.format(), catalog.volume().title());

// List usable tones
for entry in catalog.valid_entries() {
    println!("{} {} {} bytes", entry.roland_number(), entry.name, entry.length());
}

// Extract a tone and write it as WAV
let payload = catalog.export_wav(0, "I11.wav", &ExtractOptions::default())?;
println!("{} samples at {} Hz", payload.samples.len(), payload.sample_rate);
# Ok::<(), samplerdisk::DiskError>(())
```

## Disk Formats

| Format   | Signatures       | Catalog        |
|----------|------------------|----------------|
| S-550    | `S550`, `S330`   | full           |
| S-50     | `S-50`, `S-51`   | not yet        |
| W-30     | `W-30`           | not yet        |

## Modules

- `image`: Loading images and bounds-checked byte access
- `format`: Format identification and layout tables
- `catalog`: Catalog parsers, entries and validation
- `extract`: Tone payload extraction and sample unpacking
- `disk`: `DiskCatalog`, the opened disk facade
- `io`: WAV output
- `map`: Wave memory map visualization
- `report`: Plain text parameter report
- `error`: Error types and Result alias
*/

#![warn(missing_docs)]

/// Catalog parsers, entries and validation
pub mod catalog;
/// Opened disk facade
pub mod disk;
/// Error types and Result alias
pub mod error;
/// Tone payload extraction
pub mod extract;
/// Format identification and layout tables
pub mod format;
/// Image loading and bounds-checked reads
pub mod image;
/// I/O operations for writing extracted tones
pub mod io;
/// Wave memory map visualization
pub mod map;
/// Plain text disk reports
pub mod report;

// Re-export common types
pub use catalog::{
    midi_channel, note_name, on_off, parser_for, roland_number, CatalogEntry, CatalogParser,
    FunctionParams, InvalidReason, Location, LoopMode, MidiParams, ParsedCatalog, PatchEntry,
    S50Catalog, S550Catalog, Validity, VolumeMetadata, W30Catalog, WaveUsage,
};
pub use disk::DiskCatalog;
pub use error::{DiskError, Result};
pub use extract::{extract, ExtractOptions, SamplePayload};
pub use format::{identify, CatalogLayout, FormatKind, StorageLayout};
pub use image::{ByteReader, DiskImage};
pub use report::{disk_report, save_report};
