/// Wave memory map visualization

use crate::catalog::roland_number;
use crate::catalog::walk::segment_owners;
use crate::disk::DiskCatalog;
use std::fmt::Write;

/// ANSI color codes for the wave map
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
    pub const DARK_WHITE: &str = "\x1b[37m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
}

const CELL_FREE: &str = "---";

/// Render the wave memory map as text
///
/// One row per bank, one cell per segment. A cell shows the Roland number
/// of the tone owning it; `*` marks segments shared by several tones.
pub fn render_wave_map(catalog: &DiskCatalog, use_color: bool) -> String {
    let layout = catalog.layout();
    let owners = segment_owners(catalog.entries(), layout);
    let paint = |color: &'static str| if use_color { color } else { "" };
    let reset = paint(colors::RESET);

    let mut out = String::new();
    let _ = writeln!(out, "=== Wave Memory ({}) ===", catalog.format());
    let _ = writeln!(
        out,
        "Legend: {}I11{} tone  {}I11*{} shared  {}{}{} free",
        paint(colors::BRIGHT_WHITE),
        reset,
        paint(colors::BRIGHT_YELLOW),
        reset,
        paint(colors::DARK_WHITE),
        CELL_FREE,
        reset
    );
    let _ = writeln!(out);

    // Segment number axis
    let _ = write!(out, "    ");
    for segment in 0..layout.segments_per_bank {
        let _ = write!(out, "{:<5}", segment + 1);
    }
    let _ = writeln!(out);

    for bank in 0..layout.bank_count {
        let _ = write!(out, "{:<4}", (b'A' + bank as u8) as char);
        for segment in 0..layout.segments_per_bank {
            let cell = &owners[bank * layout.segments_per_bank + segment];
            match cell.as_slice() {
                [] => {
                    let _ = write!(out, "{}{:<5}{}", paint(colors::DARK_WHITE), CELL_FREE, reset);
                }
                [only] => {
                    let _ = write!(
                        out,
                        "{}{:<5}{}",
                        paint(colors::BRIGHT_WHITE),
                        roland_number(*only),
                        reset
                    );
                }
                [first, ..] => {
                    let _ = write!(
                        out,
                        "{}{:<5}{}",
                        paint(colors::BRIGHT_YELLOW),
                        format!("{}*", roland_number(*first)),
                        reset
                    );
                }
            }
        }
        let _ = writeln!(out);
    }

    let usage = &catalog.volume().usage;
    let _ = writeln!(
        out,
        "\nUsed {} of {} segments ({} KB free)",
        usage.used_segments,
        usage.total_segments,
        usage.free_bytes() / 1024
    );
    out
}

/// Draw the wave memory map to stdout
pub fn draw_wave_map(catalog: &DiskCatalog) {
    print!("{}", render_wave_map(catalog, true));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{IMAGE_SIZE, TONES_OFFSET, TONE_SIZE};

    #[test]
    fn test_render_wave_map() {
        let mut data = vec![0u8; IMAGE_SIZE];
        data[4..8].copy_from_slice(b"S550");
        // Tone I11 in A1-A2, tone I12 sharing A2, tone I13 in B18
        let tones = [(0usize, 0u8, 0u8, 2u8), (1, 0, 1, 1), (2, 1, 17, 1)];
        for (slot, bank, top, len) in tones {
            let base = TONES_OFFSET + slot * TONE_SIZE;
            data[base..base + 8].copy_from_slice(b"TONE    ");
            data[base + 13] = bank;
            data[base + 14] = top;
            data[base + 15] = len;
        }

        let catalog = DiskCatalog::from_bytes(data).unwrap();
        let map = render_wave_map(&catalog, false);
        let lines: Vec<&str> = map.lines().collect();

        let bank_a = lines.iter().find(|l| l.starts_with('A')).unwrap();
        let bank_b = lines.iter().find(|l| l.starts_with('B')).unwrap();
        assert!(bank_a.starts_with("A   I11  I11* ---"));
        assert!(bank_b.trim_end().ends_with("I13"));
        assert!(map.contains("Used 3 of 36 segments"));
        assert!(!map.contains('\x1b'));
    }
}
