/// Plain text disk report
///
/// Lists every decoded parameter: function block, MIDI block, patches and
/// tones. Flagged tone slots are included with their reason.

use crate::catalog::{midi_channel, note_name, on_off, roland_number, Location};
use crate::disk::DiskCatalog;
use crate::error::Result;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn join<T, F: Fn(&T) -> String>(values: &[T], show: F) -> String {
    values.iter().map(show).collect::<Vec<_>>().join(" ")
}

/// Render the full report for a catalog
pub fn disk_report(catalog: &DiskCatalog) -> String {
    let volume = catalog.volume();
    let function = &volume.function;
    let midi = &volume.midi;
    let mut out = String::new();

    let _ = writeln!(out, "Disk Report");
    if let Some(filename) = catalog.image().filename() {
        let _ = writeln!(out, "File:  {}", filename);
    }
    let _ = writeln!(out, "Format:  {}", catalog.format());
    let _ = writeln!(
        out,
        "System:  {}",
        volume.system_version.as_deref().unwrap_or("unknown")
    );
    let _ = writeln!(
        out,
        "Wave memory:  {} of {} segments used",
        volume.usage.used_segments, volume.usage.total_segments
    );

    let _ = writeln!(out, "\nFunction Data:");
    let _ = writeln!(out, "DISK LABEL:");
    for line in &volume.label {
        let _ = writeln!(out, "  {}", line.trim_end());
    }
    let _ = writeln!(out, "MASTER TUNE:  {}", function.master_tune);
    let _ = writeln!(out, "VOICE MODE:  {}", function.voice_mode_name());
    let _ = writeln!(
        out,
        "MULTI MIDI RX-CH:  {}",
        join(&function.rx_channels, |&v| midi_channel(v))
    );
    let _ = writeln!(
        out,
        "MULTI PATCH NUMBER:  {}",
        join(&function.patch_numbers, |&v| roland_number(v as usize))
    );
    let _ = writeln!(
        out,
        "MULTI LEVEL:  {}",
        join(&function.levels, |v| v.to_string())
    );
    if let Some(name) = function.keyboard_display_name() {
        let _ = writeln!(out, "KEYBOARD DISPLAY:  {}", name);
    }
    if let Some(name) = function.external_controller_name() {
        let _ = writeln!(out, "EXTERNAL CONTROLLER:  {}", name);
    }

    let _ = writeln!(out, "\nMIDI Data:");
    let _ = writeln!(out, "RX CHANNEL:  {}", join(&midi.rx_channel, |&v| midi_channel(v)));
    let switches = [
        ("RX PROGRAM CHANGE", &midi.rx_program_change),
        ("RX BENDER", &midi.rx_bender),
        ("RX MODULATION", &midi.rx_modulation),
        ("RX HOLD", &midi.rx_hold),
        ("RX AFTER TOUCH", &midi.rx_aftertouch),
        ("RX VOLUME", &midi.rx_volume),
        ("RX BEND RANGE", &midi.rx_bend_range),
    ];
    for (name, values) in switches {
        let _ = writeln!(out, "{}:  {}", name, join(values, |&v| on_off(v).to_string()));
    }
    let _ = writeln!(out, "SYSTEM EXCLUSIVE:  {}", on_off(midi.system_exclusive as u8));
    let _ = writeln!(out, "DEVICE ID:  {}", midi.device_id as u16 + 1);
    let _ = writeln!(
        out,
        "PROGRAM CHANGE NUMBER:  {}",
        join(&midi.program_numbers, |&v| (v as u16 + 1).to_string())
    );

    let _ = writeln!(out, "\nPatch Data:");
    for patch in catalog.patches() {
        let _ = writeln!(out, "PATCH:  {}", patch.index + 1);
        let _ = writeln!(out, "NAME:  {}", patch.name);
        let _ = writeln!(out, "KEY MODE:  {}", patch.key_mode_name());
        let _ = writeln!(out, "OUTPUT LEVEL:  {}", patch.output_level);
        let _ = writeln!(
            out,
            "TONES:  {}",
            patch
                .tones
                .iter()
                .map(|&t| roland_number(t))
                .collect::<Vec<_>>()
                .join(" ")
        );
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "\nTone Data:");
    for entry in catalog.entries() {
        let _ = writeln!(out, "TONE:  {}", entry.roland_number());
        let _ = writeln!(out, "NAME:  {}", entry.name);
        match entry.invalid_reason() {
            Some(reason) => {
                let _ = writeln!(out, "STATUS:  invalid ({})", reason);
            }
            None => {
                let _ = writeln!(out, "STATUS:  valid");
            }
        }
        match entry.sample_rate() {
            Some(rate) => {
                let _ = writeln!(out, "FREQUENCY:  {} Hz", rate);
            }
            None => {
                let _ = writeln!(out, "FREQUENCY:  code {}", entry.rate_code);
            }
        }
        let _ = writeln!(out, "ORIG/SUB TONE:  {}", if entry.sub_tone { "Sub" } else { "Orig" });
        if entry.sub_tone {
            let _ = writeln!(
                out,
                "SOURCE TONE:  {}",
                roland_number(entry.source_tone as usize)
            );
        }
        let _ = writeln!(
            out,
            "ORIG KEY NUMBER:  {} ({})",
            note_name(entry.original_key),
            entry.original_key
        );
        let _ = writeln!(out, "WAVE BANK:  {}", entry.wave_bank);
        let _ = writeln!(out, "WAVE SEGMENT TOP:  {}", entry.segment_top);
        let _ = writeln!(out, "WAVE SEGMENT LENGTH:  {}", entry.segment_length);
        if let Location::Contiguous { offset, length } = entry.location {
            let _ = writeln!(out, "LOCATION:  {} ({} bytes)", offset, length);
        }
        let _ = writeln!(out, "START POINT:  {}", entry.start_point);
        let _ = writeln!(out, "END POINT:  {}", entry.end_point);
        let _ = writeln!(out, "LOOP POINT:  {}", entry.loop_point);
        let _ = writeln!(out, "LOOP MODE:  {}", entry.loop_mode);
        let _ = writeln!(out, "FINE TUNE:  {}", entry.fine_tune);
        let _ = writeln!(out, "LEVEL:  {}", entry.level);
        let _ = writeln!(out);
    }

    out
}

/// Write the report to a text file
pub fn save_report<P: AsRef<Path>>(catalog: &DiskCatalog, path: P) -> Result<()> {
    let report = disk_report(catalog);
    let mut writer = BufWriter::new(File::create(&path)?);
    writer.write_all(report.as_bytes())?;
    writer.flush()?;
    log::info!("Wrote disk report to {}", path.as_ref().display());
    Ok(())
}
