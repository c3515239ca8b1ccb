/// Per-variant catalog layouts
///
/// The three disk formats share one directory shape: a fixed patch table, a
/// function block holding the disk label, a fixed tone table and a wave
/// area split into banks of segments. What differs is table geometry and a
/// handful of field positions, so each variant is described by a
/// `CatalogLayout` value and walked by the same code.

use super::constants::*;

/// How a tone's wave data is stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLayout {
    /// One run of whole segments
    Contiguous,
    /// Segments scattered through wave memory
    Fragmented,
}

/// Byte positions of tone record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneFields {
    /// Name field offset
    pub name: usize,
    /// Name field length
    pub name_len: usize,
    /// Source tone number (used by sub tones)
    pub source_tone: usize,
    /// Original (0) or sub (1) tone flag
    pub sub_tone: usize,
    /// Sampling frequency code
    pub rate: usize,
    /// Original key MIDI note
    pub original_key: usize,
    /// Wave bank (0 = A, 1 = B, 2 = none)
    pub wave_bank: usize,
    /// First segment within the bank
    pub segment_top: usize,
    /// Length in segments
    pub segment_length: usize,
    /// Start point (24-bit)
    pub start_point: usize,
    /// End point (24-bit)
    pub end_point: usize,
    /// Loop point (24-bit)
    pub loop_point: usize,
    /// Loop mode
    pub loop_mode: usize,
    /// Fine tune
    pub fine_tune: usize,
    /// Is fine tune stored signed?
    pub fine_tune_signed: bool,
    /// Tone level
    pub level: usize,
}

/// Byte positions of patch record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchFields {
    /// Name field length (name is at offset 0)
    pub name_len: usize,
    /// Key mode
    pub key_mode: usize,
    /// First tone-to-key map
    pub key_map_1: usize,
    /// Second tone-to-key map
    pub key_map_2: usize,
    /// Length of each tone-to-key map
    pub key_map_len: usize,
    /// Output level
    pub output_level: usize,
}

/// Byte positions inside the function parameter block
///
/// The multi fields are `MULTI_PARTS` bytes, one per part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionFields {
    /// Master tune (signed)
    pub master_tune: usize,
    /// Voice mode
    pub voice_mode: usize,
    /// Multi MIDI receive channels
    pub multi_rx_channel: usize,
    /// Multi patch numbers
    pub multi_patch_number: usize,
    /// Multi levels
    pub multi_level: usize,
    /// Keyboard display (S-550 only)
    pub keyboard_display: Option<usize>,
    /// External controller (S-550 only)
    pub external_controller: Option<usize>,
}

/// Byte positions inside the MIDI parameter block
///
/// The receive switches are `MULTI_PARTS` bytes, one per part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiFields {
    /// Receive channel per part
    pub rx_channel: usize,
    /// Receive program change switch per part
    pub rx_program_change: usize,
    /// Receive bender switch per part
    pub rx_bender: usize,
    /// Receive modulation switch per part
    pub rx_modulation: usize,
    /// Receive hold switch per part
    pub rx_hold: usize,
    /// Receive aftertouch switch per part
    pub rx_aftertouch: usize,
    /// Receive volume switch per part
    pub rx_volume: usize,
    /// Receive bend range switch per part
    pub rx_bend_range: usize,
    /// System exclusive switch
    pub system_exclusive: usize,
    /// Device ID
    pub device_id: usize,
    /// Program change number table
    pub program_numbers: usize,
    /// Entries in the program change number table
    pub program_numbers_len: usize,
}

/// Complete description of one variant's catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLayout {
    /// Patch table offset
    pub patch_table: usize,
    /// Bytes per patch record
    pub patch_stride: usize,
    /// Number of patch slots
    pub patch_count: usize,
    /// Patch field positions
    pub patch_fields: PatchFields,
    /// Function block offset
    pub function_block: usize,
    /// Function block size
    pub function_size: usize,
    /// Disk label offset inside the function block
    pub label_field: usize,
    /// Function parameter positions
    pub function_fields: FunctionFields,
    /// MIDI block offset
    pub midi_block: usize,
    /// MIDI block size
    pub midi_size: usize,
    /// MIDI parameter positions
    pub midi_fields: MidiFields,
    /// Tone table offset
    pub tone_table: usize,
    /// Bytes per tone record
    pub tone_stride: usize,
    /// Number of tone slots
    pub tone_count: usize,
    /// Tone field positions
    pub tone_fields: ToneFields,
    /// Wave data offset
    pub wave_offset: usize,
    /// Bytes per wave segment
    pub segment_size: usize,
    /// Segments per bank
    pub segments_per_bank: usize,
    /// Number of banks
    pub bank_count: usize,
    /// Physical storage of tone wave data
    pub storage: StorageLayout,
}

/// (field, offset, width) triples checked against a record size
type Span = (&'static str, usize, usize);

/// First span that doesn't fit inside `size` bytes
fn first_overflow(record: &str, size: usize, spans: &[Span]) -> Option<String> {
    spans.iter().find_map(|&(field, offset, width)| {
        match offset.checked_add(width) {
            Some(end) if end <= size => None,
            _ => Some(format!(
                "{} field {} at {} ({} bytes) overruns its {} byte record",
                record, field, offset, width, size
            )),
        }
    })
}

impl ToneFields {
    fn spans(&self) -> [Span; 14] {
        [
            ("name", self.name, self.name_len),
            ("source tone", self.source_tone, 1),
            ("sub tone", self.sub_tone, 1),
            ("rate", self.rate, 1),
            ("original key", self.original_key, 1),
            ("wave bank", self.wave_bank, 1),
            ("segment top", self.segment_top, 1),
            ("segment length", self.segment_length, 1),
            ("start point", self.start_point, 3),
            ("end point", self.end_point, 3),
            ("loop point", self.loop_point, 3),
            ("loop mode", self.loop_mode, 1),
            ("fine tune", self.fine_tune, 1),
            ("level", self.level, 1),
        ]
    }
}

impl PatchFields {
    fn spans(&self) -> [Span; 5] {
        [
            ("name", 0, self.name_len),
            ("key mode", self.key_mode, 1),
            ("key map 1", self.key_map_1, self.key_map_len),
            ("key map 2", self.key_map_2, self.key_map_len),
            ("output level", self.output_level, 1),
        ]
    }
}

impl FunctionFields {
    fn spans(&self, label_field: usize) -> Vec<Span> {
        let mut spans = vec![
            ("master tune", self.master_tune, 1),
            ("voice mode", self.voice_mode, 1),
            ("multi rx channel", self.multi_rx_channel, MULTI_PARTS),
            ("multi patch number", self.multi_patch_number, MULTI_PARTS),
            ("multi level", self.multi_level, MULTI_PARTS),
            ("disk label", label_field, LABEL_LEN),
        ];
        if let Some(offset) = self.keyboard_display {
            spans.push(("keyboard display", offset, 1));
        }
        if let Some(offset) = self.external_controller {
            spans.push(("external controller", offset, 1));
        }
        spans
    }
}

impl MidiFields {
    fn spans(&self) -> [Span; 11] {
        [
            ("rx channel", self.rx_channel, MULTI_PARTS),
            ("rx program change", self.rx_program_change, MULTI_PARTS),
            ("rx bender", self.rx_bender, MULTI_PARTS),
            ("rx modulation", self.rx_modulation, MULTI_PARTS),
            ("rx hold", self.rx_hold, MULTI_PARTS),
            ("rx aftertouch", self.rx_aftertouch, MULTI_PARTS),
            ("rx volume", self.rx_volume, MULTI_PARTS),
            ("rx bend range", self.rx_bend_range, MULTI_PARTS),
            ("system exclusive", self.system_exclusive, 1),
            ("device id", self.device_id, 1),
            ("program numbers", self.program_numbers, self.program_numbers_len),
        ]
    }
}

impl CatalogLayout {
    /// Total wave segments
    pub fn wave_segments(&self) -> usize {
        self.segments_per_bank.saturating_mul(self.bank_count)
    }

    /// Size of the tone table, if it doesn't overflow
    pub fn tone_table_len(&self) -> Option<usize> {
        self.tone_stride.checked_mul(self.tone_count)
    }

    /// End of the tone table, if it doesn't overflow
    pub fn tone_table_end(&self) -> Option<usize> {
        self.tone_table.checked_add(self.tone_table_len()?)
    }

    /// Size of the patch table, if it doesn't overflow
    pub fn patch_table_len(&self) -> Option<usize> {
        self.patch_stride.checked_mul(self.patch_count)
    }

    /// End of the patch table, if it doesn't overflow
    pub fn patch_table_end(&self) -> Option<usize> {
        self.patch_table.checked_add(self.patch_table_len()?)
    }

    /// End of the wave area, if it doesn't overflow
    pub fn wave_end(&self) -> Option<usize> {
        self.segments_per_bank
            .checked_mul(self.bank_count)?
            .checked_mul(self.segment_size)?
            .checked_add(self.wave_offset)
    }

    /// Check that the table geometry is self-consistent
    ///
    /// Returns a description of the first problem found. A layout that
    /// passes can be walked without any field read leaving its record.
    pub fn check(&self) -> Option<String> {
        if self.tone_count == 0 {
            return Some("impossible tone table: no slots".to_string());
        }
        let Some(tone_end) = self.tone_table_end() else {
            return Some(format!(
                "tone table size overflows: {} slots of {} bytes",
                self.tone_count, self.tone_stride
            ));
        };
        if self.patch_table_end().is_none() {
            return Some(format!(
                "patch table size overflows: {} slots of {} bytes",
                self.patch_count, self.patch_stride
            ));
        }
        if self.function_block.checked_add(self.function_size).is_none()
            || self.midi_block.checked_add(self.midi_size).is_none()
        {
            return Some("parameter block extends past the address space".to_string());
        }

        if let Some(problem) = first_overflow("tone", self.tone_stride, &self.tone_fields.spans()) {
            return Some(problem);
        }
        if self.patch_count > 0 {
            if let Some(problem) =
                first_overflow("patch", self.patch_stride, &self.patch_fields.spans())
            {
                return Some(problem);
            }
        }
        if let Some(problem) = first_overflow(
            "function",
            self.function_size,
            &self.function_fields.spans(self.label_field),
        ) {
            return Some(problem);
        }
        if let Some(problem) = first_overflow("MIDI", self.midi_size, &self.midi_fields.spans()) {
            return Some(problem);
        }

        if tone_end > self.wave_offset {
            return Some(format!(
                "tone table ends at {} inside wave data at {}",
                tone_end, self.wave_offset
            ));
        }
        if self.segment_size == 0 || self.segment_size % PACKED_PAIR_SIZE != 0 {
            return Some(format!("bad segment size: {}", self.segment_size));
        }
        // Bank and segment numbers are single bytes
        if self.bank_count > 256 || self.segments_per_bank > 256 || self.wave_end().is_none() {
            return Some(format!(
                "impossible wave area: {} banks of {} segments",
                self.bank_count, self.segments_per_bank
            ));
        }
        None
    }
}

const S550_TONE_FIELDS: ToneFields = ToneFields {
    name: 0,
    name_len: 8,
    source_tone: 9,
    sub_tone: 10,
    rate: 11,
    original_key: 12,
    wave_bank: 13,
    segment_top: 14,
    segment_length: 15,
    start_point: 16,
    end_point: 19,
    loop_point: 22,
    loop_mode: 25,
    fine_tune: 37,
    fine_tune_signed: true,
    level: 71,
};

const S550_FUNCTION_FIELDS: FunctionFields = FunctionFields {
    master_tune: 0,
    voice_mode: 16,
    multi_rx_channel: 17,
    multi_patch_number: 25,
    multi_level: 43,
    keyboard_display: Some(42),
    external_controller: Some(115),
};

/// S-550 / S-330 layout
pub const S550_LAYOUT: CatalogLayout = CatalogLayout {
    patch_table: PATCHES_OFFSET,
    patch_stride: 256,
    patch_count: 16,
    patch_fields: PatchFields {
        name_len: 12,
        key_mode: 15,
        key_map_1: 17,
        key_map_2: 126,
        key_map_len: 109,
        output_level: 237,
    },
    function_block: FUNCTION_OFFSET,
    function_size: FUNCTION_SIZE,
    label_field: LABEL_FIELD_OFFSET,
    function_fields: S550_FUNCTION_FIELDS,
    midi_block: MIDI_OFFSET,
    midi_size: MIDI_SIZE,
    midi_fields: MidiFields {
        rx_channel: 64,
        rx_program_change: 72,
        rx_bender: 80,
        rx_modulation: 88,
        rx_hold: 96,
        rx_aftertouch: 104,
        rx_volume: 112,
        rx_bend_range: 120,
        system_exclusive: 129,
        device_id: 130,
        program_numbers: 131,
        program_numbers_len: 32,
    },
    tone_table: TONES_OFFSET,
    tone_stride: TONE_SIZE,
    tone_count: TONE_COUNT,
    tone_fields: S550_TONE_FIELDS,
    wave_offset: WAVE_OFFSET,
    segment_size: SEGMENT_SIZE,
    segments_per_bank: SEGMENTS_PER_BANK,
    bank_count: BANK_COUNT,
    storage: StorageLayout::Contiguous,
};

/// S-50 layout
///
/// Patch records are 512 bytes with padding and there are only 8 of them.
/// The MIDI block carries transmit settings first, so the receive fields
/// sit lower. The wave offset is believed correct but is unconfirmed.
pub const S50_LAYOUT: CatalogLayout = CatalogLayout {
    patch_stride: 512,
    patch_count: 8,
    patch_fields: PatchFields {
        name_len: 12,
        key_mode: 19,
        key_map_1: 40,
        key_map_2: 168,
        key_map_len: 128,
        output_level: 298,
    },
    function_fields: FunctionFields {
        keyboard_display: None,
        external_controller: None,
        ..S550_FUNCTION_FIELDS
    },
    midi_fields: MidiFields {
        rx_channel: 32,
        rx_program_change: 40,
        rx_bender: 48,
        rx_modulation: 56,
        rx_hold: 64,
        rx_aftertouch: 72,
        rx_volume: 80,
        rx_bend_range: 88,
        system_exclusive: 97,
        device_id: 98,
        program_numbers: 16,
        program_numbers_len: 8,
    },
    tone_fields: ToneFields {
        fine_tune_signed: false,
        ..S550_TONE_FIELDS
    },
    ..S550_LAYOUT
};

/// W-30 layout
///
/// Mostly S-550 compatible, but some disks decode inconsistently.
pub const W30_LAYOUT: CatalogLayout = S550_LAYOUT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts_are_consistent() {
        assert_eq!(S550_LAYOUT.check(), None);
        assert_eq!(S50_LAYOUT.check(), None);
        assert_eq!(W30_LAYOUT.check(), None);
    }

    #[test]
    fn test_s550_geometry() {
        assert_eq!(S550_LAYOUT.wave_segments(), 36);
        assert_eq!(S550_LAYOUT.tone_table_end(), Some(73_216));
        assert_eq!(S550_LAYOUT.patch_table_end(), Some(FUNCTION_OFFSET));
        assert_eq!(S550_LAYOUT.wave_end(), Some(IMAGE_SIZE));
    }

    #[test]
    fn test_s50_patch_table_fits() {
        assert_eq!(S50_LAYOUT.patch_table_end(), Some(PATCHES_OFFSET + 4096));
        assert!(
            S50_LAYOUT.patch_fields.key_map_2 + S50_LAYOUT.patch_fields.key_map_len
                <= S50_LAYOUT.patch_stride
        );
    }

    #[test]
    fn test_check_rejects_overlapping_tone_table() {
        let layout = CatalogLayout {
            tone_count: 64,
            ..S550_LAYOUT
        };
        assert!(layout.check().is_some());
    }

    #[test]
    fn test_check_rejects_zero_stride() {
        let layout = CatalogLayout {
            tone_stride: 0,
            ..S550_LAYOUT
        };
        assert!(layout.check().is_some());
    }

    #[test]
    fn test_check_rejects_fields_past_tone_stride() {
        // Fine tune at 37 and level at 71 no longer fit
        let layout = CatalogLayout {
            tone_stride: 16,
            ..S550_LAYOUT
        };
        let problem = layout.check().unwrap();
        assert!(problem.contains("tone field"), "{}", problem);
    }

    #[test]
    fn test_check_rejects_point_overrunning_stride() {
        let layout = CatalogLayout {
            tone_fields: ToneFields {
                loop_point: TONE_SIZE - 2,
                ..S550_TONE_FIELDS
            },
            ..S550_LAYOUT
        };
        assert!(layout.check().unwrap().contains("loop point"));
    }

    #[test]
    fn test_check_rejects_patch_fields_past_stride() {
        let layout = CatalogLayout {
            patch_fields: PatchFields {
                key_map_2: 200,
                ..S550_LAYOUT.patch_fields
            },
            ..S550_LAYOUT
        };
        assert!(layout.check().unwrap().contains("key map 2"));

        let layout = CatalogLayout {
            patch_fields: PatchFields {
                output_level: 256,
                ..S550_LAYOUT.patch_fields
            },
            ..S550_LAYOUT
        };
        assert!(layout.check().unwrap().contains("output level"));
    }

    #[test]
    fn test_check_rejects_label_past_function_block() {
        let layout = CatalogLayout {
            label_field: FUNCTION_SIZE - LABEL_LEN + 1,
            ..S550_LAYOUT
        };
        assert!(layout.check().unwrap().contains("disk label"));
    }

    #[test]
    fn test_check_rejects_midi_fields_past_block() {
        let layout = CatalogLayout {
            midi_size: 100,
            ..S550_LAYOUT
        };
        assert!(layout.check().unwrap().contains("MIDI field"));
    }

    #[test]
    fn test_check_rejects_overflowing_tables() {
        let layout = CatalogLayout {
            tone_count: usize::MAX / 2,
            ..S550_LAYOUT
        };
        assert_eq!(layout.tone_table_end(), None);
        assert!(layout.check().unwrap().contains("overflows"));

        let layout = CatalogLayout {
            patch_count: usize::MAX,
            ..S550_LAYOUT
        };
        assert_eq!(layout.patch_table_end(), None);
        assert!(layout.check().is_some());

        let layout = CatalogLayout {
            label_field: usize::MAX,
            ..S550_LAYOUT
        };
        assert!(layout.check().is_some());
    }

    #[test]
    fn test_check_rejects_huge_wave_area() {
        let layout = CatalogLayout {
            segments_per_bank: usize::MAX,
            ..S550_LAYOUT
        };
        assert_eq!(layout.wave_segments(), usize::MAX);
        assert!(layout.check().unwrap().contains("wave area"));
    }
}
