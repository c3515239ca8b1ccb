/// Directory walk driven by a `CatalogLayout`
///
/// The walk is tolerant: a structural region that can't be read is fatal,
/// but a bad tone slot is kept, flagged and skipped over.

use super::notation::unscramble_label;
use super::{
    CatalogEntry, FunctionParams, InvalidReason, Location, LoopMode, MidiParams, ParsedCatalog,
    PatchEntry, Validity, VolumeMetadata, WaveUsage,
};
use crate::error::{DiskError, Result};
use crate::format::{
    CatalogLayout, FormatKind, StorageLayout, SAMPLE_BITS, VERSION_LEN, VERSION_OFFSET,
    WAVE_BANK_NONE,
};
use crate::image::ByteReader;
use std::collections::BTreeSet;

/// Parse a complete catalog using a layout table
pub fn parse_catalog(
    reader: &ByteReader<'_>,
    format: FormatKind,
    layout: &CatalogLayout,
) -> Result<ParsedCatalog> {
    if let Some(problem) = layout.check() {
        return Err(DiskError::corrupt(problem));
    }

    let entries = read_tones(reader, layout)?;
    let patches = read_patches(reader, layout)?;
    let label = read_label(reader, layout)?;
    let function = read_function(reader, layout)?;
    let midi = read_midi(reader, layout)?;
    let system_version = read_system_version(reader);
    let usage = wave_usage(&entries, layout);

    let invalid = entries.iter().filter(|e| !e.is_valid()).count();
    log::info!(
        "Read {} catalog: {} tones ({} flagged), {} patches, {} of {} segments used",
        format,
        entries.len(),
        invalid,
        patches.len(),
        usage.used_segments,
        usage.total_segments
    );

    Ok(ParsedCatalog {
        entries,
        patches,
        volume: VolumeMetadata {
            format,
            image_size: reader.len(),
            system_version,
            label,
            usage,
            function,
            midi,
        },
    })
}

/// Read every tone slot in table order
pub fn read_tones(reader: &ByteReader<'_>, layout: &CatalogLayout) -> Result<Vec<CatalogEntry>> {
    let table_len = layout
        .tone_table_len()
        .ok_or_else(|| DiskError::corrupt("tone table size overflows"))?;
    let table = reader.sub(layout.tone_table, table_len).map_err(|_| {
        DiskError::corrupt(format!(
            "tone table at {} ({} bytes) lies outside the image",
            layout.tone_table, table_len
        ))
    })?;

    let mut entries = Vec::with_capacity(layout.tone_count);
    for index in 0..layout.tone_count {
        let record = table.sub(index * layout.tone_stride, layout.tone_stride)?;
        let entry = read_tone(&record, index, reader, layout)?;
        if let Some(reason) = entry.invalid_reason() {
            if reason != InvalidReason::EmptySlot {
                log::warn!("Tone {} ({}) flagged: {}", index, entry.name, reason);
            }
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// Decode one tone record and validate it against the image
fn read_tone(
    record: &ByteReader<'_>,
    index: usize,
    image: &ByteReader<'_>,
    layout: &CatalogLayout,
) -> Result<CatalogEntry> {
    let fields = &layout.tone_fields;

    let raw_name = record.read(fields.name, fields.name_len)?;
    let name = record
        .fixed_str(fields.name, fields.name_len)?
        .trim_end_matches([' ', '\0'])
        .to_string();

    let rate_code = record.u8(fields.rate)?;
    let wave_bank = record.u8(fields.wave_bank)?;
    let segment_top = record.u8(fields.segment_top)?;
    let segment_length = record.u8(fields.segment_length)?;

    let fine_tune = if fields.fine_tune_signed {
        record.i8(fields.fine_tune)? as i16
    } else {
        record.u8(fields.fine_tune)? as i16
    };

    let first_segment = (wave_bank as usize)
        .saturating_mul(layout.segments_per_bank)
        .saturating_add(segment_top as usize);
    let offset = layout
        .wave_offset
        .saturating_add(first_segment.saturating_mul(layout.segment_size));
    let length = (segment_length as usize).saturating_mul(layout.segment_size);

    let location = match layout.storage {
        StorageLayout::Contiguous => Location::Contiguous { offset, length },
        StorageLayout::Fragmented => Location::Fragmented {
            segments: (first_segment..first_segment + segment_length as usize).collect(),
            segment_size: layout.segment_size,
        },
    };

    // Checks run from "nothing here" to "something here but broken"
    let reason = if wave_bank == WAVE_BANK_NONE || segment_length == 0 {
        Some(InvalidReason::EmptySlot)
    } else if wave_bank as usize >= layout.bank_count {
        Some(InvalidReason::BadWaveBank(wave_bank))
    } else if rate_code > 1 {
        Some(InvalidReason::BadSampleRate(rate_code))
    } else if !name_is_printable(raw_name) {
        Some(InvalidReason::BadName)
    } else if segment_top as usize >= layout.segments_per_bank
        || first_segment.saturating_add(segment_length as usize) > layout.wave_segments()
    {
        Some(InvalidReason::ImplausibleLength)
    } else if !image.contains(offset, length) {
        Some(InvalidReason::OutsideImage)
    } else {
        None
    };

    Ok(CatalogEntry {
        index,
        name,
        rate_code,
        bits_per_sample: SAMPLE_BITS,
        channels: 1,
        wave_bank,
        segment_top,
        segment_length,
        location,
        start_point: record.u24_be(fields.start_point)?,
        end_point: record.u24_be(fields.end_point)?,
        loop_point: record.u24_be(fields.loop_point)?,
        loop_mode: LoopMode::from_byte(record.u8(fields.loop_mode)?),
        original_key: record.u8(fields.original_key)?,
        level: record.u8(fields.level)?,
        fine_tune,
        sub_tone: record.u8(fields.sub_tone)? != 0,
        source_tone: record.u8(fields.source_tone)?,
        validity: reason.map(Validity::Invalid).unwrap_or(Validity::Valid),
    })
}

/// Trailing NUL and space bytes are padding; everything before them
/// must be printable ASCII
fn name_is_printable(raw: &[u8]) -> bool {
    let used = raw
        .iter()
        .rposition(|&b| b != 0 && b != b' ')
        .map_or(0, |last| last + 1);
    raw[..used].iter().all(|&b| (0x20..0x7F).contains(&b))
}

/// Read every patch slot in table order
pub fn read_patches(reader: &ByteReader<'_>, layout: &CatalogLayout) -> Result<Vec<PatchEntry>> {
    let table_len = layout
        .patch_table_len()
        .ok_or_else(|| DiskError::corrupt("patch table size overflows"))?;
    let table = reader.sub(layout.patch_table, table_len).map_err(|_| {
        DiskError::corrupt(format!(
            "patch table at {} ({} bytes) lies outside the image",
            layout.patch_table, table_len
        ))
    })?;

    let fields = &layout.patch_fields;
    let mut patches = Vec::with_capacity(layout.patch_count);

    for index in 0..layout.patch_count {
        let record = table.sub(index * layout.patch_stride, layout.patch_stride)?;

        let name = record
            .fixed_str(0, fields.name_len)?
            .trim_end_matches([' ', '\0'])
            .to_string();

        // Both maps hold one tone number per key; anything else means "no tone"
        let mut tones = BTreeSet::new();
        for map in [fields.key_map_1, fields.key_map_2] {
            for &tone in record.read(map, fields.key_map_len)? {
                if (tone as usize) < layout.tone_count {
                    tones.insert(tone as usize);
                }
            }
        }

        patches.push(PatchEntry {
            index,
            name,
            key_mode: record.u8(fields.key_mode)?,
            output_level: record.u8(fields.output_level)?,
            tones,
        });
    }

    Ok(patches)
}

/// Read and unscramble the disk label from the function block
pub fn read_label(reader: &ByteReader<'_>, layout: &CatalogLayout) -> Result<Vec<String>> {
    let block = reader
        .sub(layout.function_block, layout.function_size)
        .map_err(|_| {
            DiskError::corrupt(format!(
                "function block at {} lies outside the image",
                layout.function_block
            ))
        })?;
    let raw = block
        .read(layout.label_field, crate::format::LABEL_LEN)
        .map_err(|_| DiskError::corrupt("disk label runs past the function block"))?;
    Ok(unscramble_label(raw))
}

/// Decode the function block parameters
pub fn read_function(reader: &ByteReader<'_>, layout: &CatalogLayout) -> Result<FunctionParams> {
    let block = reader
        .sub(layout.function_block, layout.function_size)
        .map_err(|_| {
            DiskError::corrupt(format!(
                "function block at {} lies outside the image",
                layout.function_block
            ))
        })?;
    let fields = &layout.function_fields;

    let optional = |offset: Option<usize>| -> Result<Option<u8>> {
        offset.map(|o| block.u8(o)).transpose()
    };

    Ok(FunctionParams {
        master_tune: block.i8(fields.master_tune)?,
        voice_mode: block.u8(fields.voice_mode)?,
        rx_channels: block.array(fields.multi_rx_channel)?,
        patch_numbers: block.array(fields.multi_patch_number)?,
        levels: block.array(fields.multi_level)?,
        keyboard_display: optional(fields.keyboard_display)?,
        external_controller: optional(fields.external_controller)?,
    })
}

/// Decode the MIDI block parameters
pub fn read_midi(reader: &ByteReader<'_>, layout: &CatalogLayout) -> Result<MidiParams> {
    let block = reader
        .sub(layout.midi_block, layout.midi_size)
        .map_err(|_| {
            DiskError::corrupt(format!(
                "MIDI block at {} lies outside the image",
                layout.midi_block
            ))
        })?;
    let fields = &layout.midi_fields;

    Ok(MidiParams {
        rx_channel: block.array(fields.rx_channel)?,
        rx_program_change: block.array(fields.rx_program_change)?,
        rx_bender: block.array(fields.rx_bender)?,
        rx_modulation: block.array(fields.rx_modulation)?,
        rx_hold: block.array(fields.rx_hold)?,
        rx_aftertouch: block.array(fields.rx_aftertouch)?,
        rx_volume: block.array(fields.rx_volume)?,
        rx_bend_range: block.array(fields.rx_bend_range)?,
        system_exclusive: block.u8(fields.system_exclusive)? != 0,
        device_id: block.u8(fields.device_id)?,
        program_numbers: block
            .read(fields.program_numbers, fields.program_numbers_len)?
            .to_vec(),
    })
}

/// Read the system version string, if it decodes
///
/// The version is informational only, so a bad string is logged and skipped.
pub fn read_system_version(reader: &ByteReader<'_>) -> Option<String> {
    let raw = reader.read(VERSION_OFFSET, VERSION_LEN).ok()?;
    if !raw.is_ascii() {
        log::warn!("Unable to decode system version string");
        return None;
    }

    let version = String::from_utf8_lossy(raw)
        .split(|c: char| c.is_whitespace() || c == '\0')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if version.is_empty() {
        None
    } else {
        log::debug!("System version: {}", version);
        Some(version)
    }
}

/// Tone slots owning each wave segment
///
/// Only valid entries count. Sub tones sharing a source show up as extra
/// owners of the same segments.
pub fn segment_owners(entries: &[CatalogEntry], layout: &CatalogLayout) -> Vec<Vec<usize>> {
    let mut owners = vec![Vec::new(); layout.wave_segments()];
    for entry in entries.iter().filter(|e| e.is_valid()) {
        for segment in entry.segments(layout) {
            if let Some(slot) = owners.get_mut(segment) {
                slot.push(entry.index);
            }
        }
    }
    owners
}

/// Compute wave memory usage from valid entries
pub fn wave_usage(entries: &[CatalogEntry], layout: &CatalogLayout) -> WaveUsage {
    let used_segments = segment_owners(entries, layout)
        .iter()
        .filter(|owners| !owners.is_empty())
        .count();

    WaveUsage {
        total_segments: layout.wave_segments(),
        used_segments,
        segment_size: layout.segment_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::layout::S550_LAYOUT;
    use crate::format::{IMAGE_SIZE, SEGMENT_SIZE, TONES_OFFSET, TONE_SIZE, WAVE_OFFSET};

    fn blank_image() -> Vec<u8> {
        let mut data = vec![0u8; IMAGE_SIZE];
        // Fill every tone slot as "no wave"
        for slot in 0..32 {
            data[TONES_OFFSET + slot * TONE_SIZE + 13] = WAVE_BANK_NONE;
        }
        data
    }

    fn set_tone(data: &mut [u8], slot: usize, name: &[u8], bank: u8, top: u8, len: u8) {
        let base = TONES_OFFSET + slot * TONE_SIZE;
        data[base..base + 8].fill(b' ');
        data[base..base + name.len()].copy_from_slice(name);
        data[base + 11] = 0;
        data[base + 13] = bank;
        data[base + 14] = top;
        data[base + 15] = len;
    }

    #[test]
    fn test_valid_tone() {
        let mut data = blank_image();
        set_tone(&mut data, 0, b"PIANO", 0, 2, 3);
        data[TONES_OFFSET + 12] = 60;
        data[TONES_OFFSET + 16..TONES_OFFSET + 19].copy_from_slice(&[0x00, 0x10, 0x00]);
        data[TONES_OFFSET + 37] = 0xFE;

        let entries = read_tones(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        let entry = &entries[0];
        assert!(entry.is_valid());
        assert_eq!(entry.name, "PIANO");
        assert_eq!(entry.original_key, 60);
        assert_eq!(entry.start_point, 0x1000);
        assert_eq!(entry.fine_tune, -2);
        assert_eq!(
            entry.location,
            Location::Contiguous {
                offset: WAVE_OFFSET + 2 * SEGMENT_SIZE,
                length: 3 * SEGMENT_SIZE
            }
        );
    }

    #[test]
    fn test_bank_b_offset() {
        let mut data = blank_image();
        set_tone(&mut data, 1, b"BASS", 1, 0, 1);
        let entries = read_tones(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert_eq!(
            entries[1].location,
            Location::Contiguous {
                offset: WAVE_OFFSET + 18 * SEGMENT_SIZE,
                length: SEGMENT_SIZE
            }
        );
    }

    #[test]
    fn test_empty_and_zeroed_slots() {
        let mut data = blank_image();
        let base = TONES_OFFSET + 5 * TONE_SIZE;
        data[base..base + TONE_SIZE].fill(0);

        let entries = read_tones(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert_eq!(entries.len(), 32);
        assert_eq!(entries[0].invalid_reason(), Some(InvalidReason::EmptySlot));
        assert_eq!(entries[5].invalid_reason(), Some(InvalidReason::EmptySlot));
    }

    #[test]
    fn test_flagged_slots_do_not_stop_walk() {
        let mut data = blank_image();
        set_tone(&mut data, 0, b"BADBANK", 7, 0, 1);
        set_tone(&mut data, 1, b"BADRATE", 0, 0, 1);
        data[TONES_OFFSET + TONE_SIZE + 11] = 5;
        set_tone(&mut data, 2, b"NAME\x01", 0, 0, 1);
        set_tone(&mut data, 3, b"TOOLONG", 1, 10, 10);
        set_tone(&mut data, 4, b"GOOD", 0, 0, 1);

        let entries = read_tones(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert_eq!(entries[0].invalid_reason(), Some(InvalidReason::BadWaveBank(7)));
        assert_eq!(entries[1].invalid_reason(), Some(InvalidReason::BadSampleRate(5)));
        assert_eq!(entries[2].invalid_reason(), Some(InvalidReason::BadName));
        assert_eq!(entries[3].invalid_reason(), Some(InvalidReason::ImplausibleLength));
        assert!(entries[4].is_valid());
    }

    #[test]
    fn test_tone_outside_truncated_image() {
        let mut data = blank_image();
        set_tone(&mut data, 0, b"LOW", 0, 0, 1);
        set_tone(&mut data, 1, b"HIGH", 1, 17, 1);
        data.truncate(WAVE_OFFSET + 4 * SEGMENT_SIZE);

        let entries = read_tones(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert!(entries[0].is_valid());
        assert_eq!(entries[1].invalid_reason(), Some(InvalidReason::OutsideImage));
    }

    #[test]
    fn test_tone_table_outside_image_is_corrupt() {
        let data = vec![0u8; TONES_OFFSET + 100];
        let result = read_tones(&ByteReader::new(&data), &S550_LAYOUT);
        assert!(matches!(result, Err(DiskError::CorruptCatalog(_))));
    }

    #[test]
    fn test_fragmented_storage_records_segments() {
        let layout = CatalogLayout {
            storage: StorageLayout::Fragmented,
            ..S550_LAYOUT
        };
        let mut data = blank_image();
        set_tone(&mut data, 0, b"FRAG", 0, 4, 2);
        let entries = read_tones(&ByteReader::new(&data), &layout).unwrap();
        assert_eq!(
            entries[0].location,
            Location::Fragmented {
                segments: vec![4, 5],
                segment_size: SEGMENT_SIZE
            }
        );
    }

    #[test]
    fn test_patch_tone_sets() {
        let mut data = blank_image();
        let base = crate::format::PATCHES_OFFSET;
        data[base..base + 12].copy_from_slice(b"DRUMS       ");
        data[base + 15] = 1;
        // Key map 1 uses tones 0 and 3, key map 2 uses 31 and an out of range 40
        data[base + 17..base + 126].fill(0);
        data[base + 20] = 3;
        data[base + 126..base + 235].fill(31);
        data[base + 200] = 40;

        let patches = read_patches(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert_eq!(patches.len(), 16);
        assert_eq!(patches[0].name, "DRUMS");
        assert_eq!(patches[0].key_mode_name(), "V-Sw");
        assert_eq!(
            patches[0].tones.iter().copied().collect::<Vec<_>>(),
            vec![0, 3, 31]
        );
    }

    #[test]
    fn test_system_version() {
        let mut data = blank_image();
        data[32..63].copy_from_slice(b"S-550  SYSTEM   Ver 2.00       ");
        assert_eq!(
            read_system_version(&ByteReader::new(&data)).as_deref(),
            Some("S-550 SYSTEM Ver 2.00")
        );

        data[40] = 0xC8;
        assert_eq!(read_system_version(&ByteReader::new(&data)), None);
    }

    #[test]
    fn test_wave_usage_counts_shared_segments_once() {
        let mut data = blank_image();
        set_tone(&mut data, 0, b"ORIG", 0, 0, 4);
        set_tone(&mut data, 1, b"SUB", 0, 0, 4);
        set_tone(&mut data, 2, b"OTHER", 1, 0, 2);

        let entries = read_tones(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        let usage = wave_usage(&entries, &S550_LAYOUT);
        assert_eq!(usage.used_segments, 6);
        assert_eq!(usage.free_segments(), 30);

        let owners = segment_owners(&entries, &S550_LAYOUT);
        assert_eq!(owners[0], vec![0, 1]);
        assert_eq!(owners[18], vec![2]);
        assert!(owners[35].is_empty());
    }

    #[test]
    fn test_nul_padded_name_is_valid() {
        let mut data = blank_image();
        set_tone(&mut data, 0, b"KICK1\0\0\0", 0, 0, 1);
        set_tone(&mut data, 1, b"\0\0\0\0\0\0\0\0", 0, 1, 1);
        set_tone(&mut data, 2, b"KI\0CK", 0, 2, 1);

        let entries = read_tones(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert_eq!(entries[0].name, "KICK1");
        assert!(entries[0].is_valid());
        assert!(entries[1].is_valid());
        // NUL inside the name is not padding
        assert_eq!(entries[2].invalid_reason(), Some(InvalidReason::BadName));
    }

    #[test]
    fn test_inconsistent_layout_is_corrupt_catalog() {
        let layout = CatalogLayout {
            tone_stride: 16,
            ..S550_LAYOUT
        };
        let data = blank_image();
        let result = parse_catalog(&ByteReader::new(&data), FormatKind::S550, &layout);
        assert!(matches!(result, Err(DiskError::CorruptCatalog(_))));

        let layout = CatalogLayout {
            tone_count: usize::MAX / 2,
            ..S550_LAYOUT
        };
        let result = parse_catalog(&ByteReader::new(&data), FormatKind::S550, &layout);
        assert!(matches!(result, Err(DiskError::CorruptCatalog(_))));
    }

    #[test]
    fn test_function_parameters() {
        use crate::format::FUNCTION_OFFSET;

        let mut data = blank_image();
        let base = FUNCTION_OFFSET;
        data[base] = 0xFB; // -5
        data[base + 16] = 3;
        data[base + 17..base + 25].copy_from_slice(&[0, 1, 2, 3, 4, 5, 6, 16]);
        data[base + 25..base + 33].copy_from_slice(&[0, 1, 2, 3, 8, 9, 10, 15]);
        data[base + 42] = 8;
        data[base + 43..base + 51].fill(127);
        data[base + 115] = 1;

        let function = read_function(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert_eq!(function.master_tune, -5);
        assert_eq!(function.voice_mode_name(), "V 2");
        assert_eq!(function.rx_channels[7], 16);
        assert_eq!(function.patch_numbers, [0, 1, 2, 3, 8, 9, 10, 15]);
        assert_eq!(function.levels, [127; 8]);
        assert_eq!(function.keyboard_display_name(), Some("ALL"));
        assert_eq!(function.external_controller_name(), Some("MOUSE"));
    }

    #[test]
    fn test_s50_function_has_no_keyboard_display() {
        use crate::format::layout::S50_LAYOUT;

        let data = blank_image();
        let function = read_function(&ByteReader::new(&data), &S50_LAYOUT).unwrap();
        assert_eq!(function.voice_mode_name(), "Last Note (VAL)");
        assert_eq!(function.keyboard_display, None);
        assert_eq!(function.external_controller_name(), None);
    }

    #[test]
    fn test_midi_parameters() {
        use crate::format::MIDI_OFFSET;

        let mut data = blank_image();
        let base = MIDI_OFFSET;
        data[base + 64..base + 72].copy_from_slice(&[0, 1, 2, 3, 4, 5, 6, 7]);
        data[base + 72..base + 80].fill(1);
        data[base + 88] = 1;
        data[base + 127] = 1;
        data[base + 129] = 1;
        data[base + 130] = 16;
        data[base + 131] = 42;
        data[base + 162] = 99;

        let midi = read_midi(&ByteReader::new(&data), &S550_LAYOUT).unwrap();
        assert_eq!(midi.rx_channel, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(midi.rx_program_change, [1; 8]);
        assert_eq!(midi.rx_bender, [0; 8]);
        assert_eq!(midi.rx_modulation[0], 1);
        assert_eq!(midi.rx_bend_range[7], 1);
        assert!(midi.system_exclusive);
        assert_eq!(midi.device_id, 16);
        assert_eq!(midi.program_numbers.len(), 32);
        assert_eq!(midi.program_numbers[0], 42);
        assert_eq!(midi.program_numbers[31], 99);
    }

    #[test]
    fn test_midi_block_outside_image_is_corrupt() {
        use crate::format::MIDI_OFFSET;

        let data = vec![0u8; MIDI_OFFSET + 10];
        let result = read_midi(&ByteReader::new(&data), &S550_LAYOUT);
        assert!(matches!(result, Err(DiskError::CorruptCatalog(_))));
    }
}
