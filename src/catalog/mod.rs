/// Catalog parsers for sampler disk images
///
/// Every variant exposes the same `CatalogParser` contract. The S-550
/// parser reads the whole catalog; the S-50 and W-30 parsers recognize
/// their disks but refuse to parse them yet.

/// Roland numbering, note names and disk label decoding
pub mod notation;
/// S-50 catalog (not yet supported)
pub mod s50;
/// S-550 / S-330 catalog
pub mod s550;
/// W-30 catalog (not yet supported)
pub mod w30;
/// Layout-driven directory walk shared by all variants
pub mod walk;

pub use notation::{midi_channel, note_name, on_off, roland_number, unscramble_label};
pub use s50::S50Catalog;
pub use s550::S550Catalog;
pub use w30::W30Catalog;

use crate::error::Result;
use crate::format::{CatalogLayout, FormatKind, MULTI_PARTS, RATE_15K, RATE_30K};
use crate::image::ByteReader;
use std::collections::BTreeSet;
use std::ops::Range;

/// Why a tone slot failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Slot holds no wave data (deleted or never used)
    EmptySlot,
    /// Name contains non-printable or non-ASCII bytes
    BadName,
    /// Wave bank is not A, B or none
    BadWaveBank(u8),
    /// Sampling frequency code is unknown
    BadSampleRate(u8),
    /// Segment range falls outside wave memory
    ImplausibleLength,
    /// Payload extent runs past the end of the image
    OutsideImage,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::EmptySlot => write!(f, "empty slot"),
            InvalidReason::BadName => write!(f, "bad name"),
            InvalidReason::BadWaveBank(bank) => write!(f, "bad wave bank {}", bank),
            InvalidReason::BadSampleRate(code) => write!(f, "bad sample rate code {}", code),
            InvalidReason::ImplausibleLength => write!(f, "implausible length"),
            InvalidReason::OutsideImage => write!(f, "outside image"),
        }
    }
}

/// Validation result for one tone slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Entry passed all checks
    Valid,
    /// Entry was kept but flagged
    Invalid(InvalidReason),
}

/// Tone loop mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Forward loop (0)
    Forward,
    /// Alternating loop (1)
    Alternate,
    /// One shot (2)
    OneShot,
    /// Reverse (3)
    Reverse,
    /// Unknown value
    Other(u8),
}

impl LoopMode {
    /// Parse from the raw loop mode byte
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => LoopMode::Forward,
            1 => LoopMode::Alternate,
            2 => LoopMode::OneShot,
            3 => LoopMode::Reverse,
            other => LoopMode::Other(other),
        }
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopMode::Forward => write!(f, "Fwd"),
            LoopMode::Alternate => write!(f, "Alt"),
            LoopMode::OneShot => write!(f, "1Shot"),
            LoopMode::Reverse => write!(f, "Reverse"),
            LoopMode::Other(value) => write!(f, "Mode {}", value),
        }
    }
}

/// Where a tone's wave data lives in the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// One run of bytes
    Contiguous {
        /// Absolute image offset
        offset: usize,
        /// Length in bytes
        length: usize,
    },
    /// Scattered segments (not extractable)
    Fragmented {
        /// Absolute wave segment numbers
        segments: Vec<usize>,
        /// Bytes per segment
        segment_size: usize,
    },
}

impl Location {
    /// Declared length in bytes
    pub fn length(&self) -> usize {
        match self {
            Location::Contiguous { length, .. } => *length,
            Location::Fragmented {
                segments,
                segment_size,
            } => segments.len() * segment_size,
        }
    }
}

/// One tone slot from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Slot index (0-31), equal to on-disk order
    pub index: usize,
    /// Tone name with trailing padding removed
    pub name: String,
    /// Sampling frequency code (0 = 30 kHz, 1 = 15 kHz)
    pub rate_code: u8,
    /// Native bits per sample
    pub bits_per_sample: u8,
    /// Number of channels
    pub channels: u8,
    /// Wave bank (0 = A, 1 = B, 2 = none)
    pub wave_bank: u8,
    /// First segment within the bank
    pub segment_top: u8,
    /// Length in segments
    pub segment_length: u8,
    /// Physical extent of the wave data
    pub location: Location,
    /// Start point
    pub start_point: u32,
    /// End point
    pub end_point: u32,
    /// Loop point
    pub loop_point: u32,
    /// Loop mode
    pub loop_mode: LoopMode,
    /// Original key (MIDI note number)
    pub original_key: u8,
    /// Tone level
    pub level: u8,
    /// Fine tune
    pub fine_tune: i16,
    /// Is this a sub tone sharing another tone's wave data?
    pub sub_tone: bool,
    /// Source tone number for sub tones
    pub source_tone: u8,
    /// Validation result
    pub validity: Validity,
}

impl CatalogEntry {
    /// Did the entry pass validation?
    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }

    /// Reason the entry was flagged, if any
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        match self.validity {
            Validity::Valid => None,
            Validity::Invalid(reason) => Some(reason),
        }
    }

    /// Declared payload length in bytes
    pub fn length(&self) -> usize {
        self.location.length()
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> Option<u32> {
        match self.rate_code {
            0 => Some(RATE_30K),
            1 => Some(RATE_15K),
            _ => None,
        }
    }

    /// Absolute wave segments covered by this tone
    pub fn segments(&self, layout: &CatalogLayout) -> Range<usize> {
        let top = self.wave_bank as usize * layout.segments_per_bank + self.segment_top as usize;
        top..top + self.segment_length as usize
    }

    /// Roland tone number (I11-I48)
    pub fn roland_number(&self) -> String {
        roland_number(self.index)
    }

    /// Wave bank letter, or `?` for a bank the layout doesn't have
    pub fn bank_letter(&self, layout: &CatalogLayout) -> char {
        match self.wave_bank {
            bank if (bank as usize) < layout.bank_count.min(26) => (b'A' + bank) as char,
            _ => '?',
        }
    }
}

/// One patch slot from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    /// Slot index
    pub index: usize,
    /// Patch name with trailing padding removed
    pub name: String,
    /// Key mode (Normal, V-Sw, X-Fade, V-Mix, Unison)
    pub key_mode: u8,
    /// Output level
    pub output_level: u8,
    /// Tone slots referenced by the tone-to-key maps
    pub tones: BTreeSet<usize>,
}

impl PatchEntry {
    /// Key mode as shown on the sampler
    pub fn key_mode_name(&self) -> &'static str {
        match self.key_mode {
            0 => "Normal",
            1 => "V-Sw",
            2 => "X-Fade",
            3 => "V-Mix",
            4 => "Unison",
            _ => "?",
        }
    }
}

/// Wave memory usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveUsage {
    /// Total wave segments
    pub total_segments: usize,
    /// Segments covered by valid tones
    pub used_segments: usize,
    /// Bytes per segment
    pub segment_size: usize,
}

impl WaveUsage {
    /// Free segments
    pub fn free_segments(&self) -> usize {
        self.total_segments.saturating_sub(self.used_segments)
    }

    /// Wave capacity in bytes
    pub fn total_bytes(&self) -> usize {
        self.total_segments * self.segment_size
    }

    /// Used wave memory in bytes
    pub fn used_bytes(&self) -> usize {
        self.used_segments * self.segment_size
    }

    /// Free wave memory in bytes
    pub fn free_bytes(&self) -> usize {
        self.free_segments() * self.segment_size
    }
}

/// Function block parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionParams {
    /// Master tune offset
    pub master_tune: i8,
    /// Voice mode (0 = VAL, 1 = VAF, 2.. = fixed V1..)
    pub voice_mode: u8,
    /// Receive channel per multi part
    pub rx_channels: [u8; MULTI_PARTS],
    /// Patch number per multi part
    pub patch_numbers: [u8; MULTI_PARTS],
    /// Level per multi part
    pub levels: [u8; MULTI_PARTS],
    /// Keyboard display part, where the variant stores one
    pub keyboard_display: Option<u8>,
    /// External controller, where the variant stores one
    pub external_controller: Option<u8>,
}

impl FunctionParams {
    /// Voice mode as shown on the sampler
    pub fn voice_mode_name(&self) -> String {
        match self.voice_mode {
            0 => "Last Note (VAL)".to_string(),
            1 => "First Note (VAF)".to_string(),
            fixed => format!("V {}", fixed - 1),
        }
    }

    /// Keyboard display part name
    pub fn keyboard_display_name(&self) -> Option<&'static str> {
        const PARTS: [&str; 9] = ["A", "B", "C", "D", "E", "F", "G", "H", "ALL"];
        self.keyboard_display
            .map(|v| PARTS.get(v as usize).copied().unwrap_or("?"))
    }

    /// External controller name
    pub fn external_controller_name(&self) -> Option<&'static str> {
        self.external_controller.map(|v| match v {
            0 => "OFF",
            1 => "MOUSE",
            2 => "RC-100",
            _ => "?",
        })
    }
}

/// MIDI block parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiParams {
    /// Receive channel per part
    pub rx_channel: [u8; MULTI_PARTS],
    /// Receive program change switch per part
    pub rx_program_change: [u8; MULTI_PARTS],
    /// Receive bender switch per part
    pub rx_bender: [u8; MULTI_PARTS],
    /// Receive modulation switch per part
    pub rx_modulation: [u8; MULTI_PARTS],
    /// Receive hold switch per part
    pub rx_hold: [u8; MULTI_PARTS],
    /// Receive aftertouch switch per part
    pub rx_aftertouch: [u8; MULTI_PARTS],
    /// Receive volume switch per part
    pub rx_volume: [u8; MULTI_PARTS],
    /// Receive bend range switch per part
    pub rx_bend_range: [u8; MULTI_PARTS],
    /// System exclusive enabled
    pub system_exclusive: bool,
    /// Device ID (0-based, shown as 1-16)
    pub device_id: u8,
    /// Program change number table
    pub program_numbers: Vec<u8>,
}

/// Image level metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMetadata {
    /// Disk format
    pub format: FormatKind,
    /// Image size in bytes
    pub image_size: usize,
    /// System software version string
    pub system_version: Option<String>,
    /// Disk label lines
    pub label: Vec<String>,
    /// Wave memory usage
    pub usage: WaveUsage,
    /// Function block parameters
    pub function: FunctionParams,
    /// MIDI block parameters
    pub midi: MidiParams,
}

impl VolumeMetadata {
    /// First label line, trimmed
    pub fn title(&self) -> &str {
        self.label.first().map(|l| l.trim()).unwrap_or("")
    }

    /// Label lines joined with newlines
    pub fn label_text(&self) -> String {
        self.label.join("\n")
    }
}

/// Everything a parser recovers from an image
#[derive(Debug, Clone)]
pub struct ParsedCatalog {
    /// Tone slots in on-disk order
    pub entries: Vec<CatalogEntry>,
    /// Patch slots in on-disk order
    pub patches: Vec<PatchEntry>,
    /// Image level metadata
    pub volume: VolumeMetadata,
}

/// Catalog parser for one disk format
pub trait CatalogParser {
    /// Format this parser handles
    fn format(&self) -> FormatKind;

    /// Layout table driving the walk
    fn layout(&self) -> &'static CatalogLayout {
        self.format().layout()
    }

    /// Walk the catalog
    ///
    /// Fails with `CorruptCatalog` when the directory structure itself is
    /// unreadable. Bad individual slots are returned flagged as invalid.
    fn parse(&self, reader: &ByteReader<'_>) -> Result<ParsedCatalog>;
}

/// Get the parser for a format
pub fn parser_for(kind: FormatKind) -> Box<dyn CatalogParser> {
    match kind {
        FormatKind::S550 => Box::new(S550Catalog),
        FormatKind::S50 => Box::new(S50Catalog),
        FormatKind::W30 => Box::new(W30Catalog),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::layout::S550_LAYOUT;

    #[test]
    fn test_loop_mode_parsing() {
        assert_eq!(LoopMode::from_byte(0), LoopMode::Forward);
        assert_eq!(LoopMode::from_byte(2), LoopMode::OneShot);
        assert_eq!(LoopMode::from_byte(9), LoopMode::Other(9));
        assert_eq!(LoopMode::Alternate.to_string(), "Alt");
    }

    #[test]
    fn test_invalid_reason_display() {
        assert_eq!(InvalidReason::EmptySlot.to_string(), "empty slot");
        assert_eq!(InvalidReason::BadWaveBank(7).to_string(), "bad wave bank 7");
    }

    #[test]
    fn test_location_length() {
        let contiguous = Location::Contiguous {
            offset: 0,
            length: 18_432,
        };
        assert_eq!(contiguous.length(), 18_432);

        let fragmented = Location::Fragmented {
            segments: vec![3, 9, 20],
            segment_size: 100,
        };
        assert_eq!(fragmented.length(), 300);
    }

    #[test]
    fn test_parser_for_matches_format() {
        for kind in FormatKind::ALL {
            let parser = parser_for(kind);
            assert_eq!(parser.format(), kind);
            assert_eq!(parser.layout(), kind.layout());
        }
    }

    #[test]
    fn test_wave_usage() {
        let usage = WaveUsage {
            total_segments: 36,
            used_segments: 10,
            segment_size: 18_432,
        };
        assert_eq!(usage.free_segments(), 26);
        assert_eq!(usage.total_bytes(), 663_552);
        assert_eq!(usage.free_bytes(), 26 * 18_432);
    }

    #[test]
    fn test_entry_segments_span_banks() {
        let entry = CatalogEntry {
            index: 0,
            name: "PIANO".to_string(),
            rate_code: 0,
            bits_per_sample: 12,
            channels: 1,
            wave_bank: 1,
            segment_top: 4,
            segment_length: 3,
            location: Location::Contiguous {
                offset: 0,
                length: 0,
            },
            start_point: 0,
            end_point: 0,
            loop_point: 0,
            loop_mode: LoopMode::Forward,
            original_key: 60,
            level: 127,
            fine_tune: 0,
            sub_tone: false,
            source_tone: 0,
            validity: Validity::Valid,
        };
        assert_eq!(entry.segments(&S550_LAYOUT), 22..25);
        assert_eq!(entry.sample_rate(), Some(30_000));
        assert_eq!(entry.roland_number(), "I11");
        assert_eq!(entry.bank_letter(&S550_LAYOUT), 'B');

        let stray = CatalogEntry {
            wave_bank: 5,
            ..entry.clone()
        };
        assert_eq!(stray.bank_letter(&S550_LAYOUT), '?');
        let none = CatalogEntry {
            wave_bank: 2,
            ..entry
        };
        assert_eq!(none.bank_letter(&S550_LAYOUT), '?');
    }
}
