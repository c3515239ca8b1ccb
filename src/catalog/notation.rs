/// Display helpers for sampler catalog values

use crate::format::MIDI_CHANNEL_OFF;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Roland slot number for a zero-based index
///
/// Roland numbers are octal digits offset by 11 and prefixed with the set
/// letter, so index 0 is `I11`, index 7 is `I18` and index 8 is `I21`.
pub fn roland_number(index: usize) -> String {
    let octal = (index / 8) * 10 + index % 8;
    format!("I{}", octal + 11)
}

/// Note name for a MIDI note number (60 is `C 4`)
pub fn note_name(note: u8) -> String {
    let degree = note as usize % 12;
    let octave = note as i32 / 12 - 1;
    format!("{} {}", NOTE_NAMES[degree], octave)
}

/// MIDI channel as shown on the sampler (0 is channel 1, 16 is off)
pub fn midi_channel(value: u8) -> String {
    if value >= MIDI_CHANNEL_OFF {
        "Off".to_string()
    } else {
        (value + 1).to_string()
    }
}

/// On/off switch value
pub fn on_off(value: u8) -> &'static str {
    if value == 0 {
        "Off"
    } else {
        "On"
    }
}

/// Rearrange a raw disk label into readable lines
///
/// The first line is stored as-is. The rest of the label is stored as 12
/// columns of 4 rows, so those lines are read down the columns.
pub fn unscramble_label(raw: &[u8]) -> Vec<String> {
    let first_len = raw.len().min(12);
    let mut lines = vec![decode_ascii(&raw[..first_len])];

    let rest = &raw[first_len..];
    let columns = rest.len() / 4;
    for row in 0..4 {
        let line: Vec<u8> = (0..columns).map(|col| rest[col * 4 + row]).collect();
        if !line.is_empty() {
            lines.push(decode_ascii(&line));
        }
    }

    lines
}

fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if (0x20..0x7F).contains(&b) {
                b as char
            } else if b == 0 {
                ' '
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roland_number() {
        assert_eq!(roland_number(0), "I11");
        assert_eq!(roland_number(7), "I18");
        assert_eq!(roland_number(8), "I21");
        assert_eq!(roland_number(15), "I28");
        assert_eq!(roland_number(31), "I48");
    }

    #[test]
    fn test_note_name() {
        assert_eq!(note_name(60), "C 4");
        assert_eq!(note_name(61), "C# 4");
        assert_eq!(note_name(12), "C 0");
        assert_eq!(note_name(0), "C -1");
        assert_eq!(note_name(69), "A 4");
    }

    #[test]
    fn test_midi_channel() {
        assert_eq!(midi_channel(0), "1");
        assert_eq!(midi_channel(15), "16");
        assert_eq!(midi_channel(16), "Off");
        assert_eq!(on_off(0), "Off");
        assert_eq!(on_off(1), "On");
    }

    #[test]
    fn test_unscramble_label() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"DRUM KIT  01");
        // Columns of "ABCD": row 0 reads AAAA.., row 1 BBBB.. etc
        for _ in 0..12 {
            raw.extend_from_slice(b"ABCD");
        }

        let lines = unscramble_label(&raw);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "DRUM KIT  01");
        assert_eq!(lines[1], "AAAAAAAAAAAA");
        assert_eq!(lines[2], "BBBBBBBBBBBB");
        assert_eq!(lines[3], "CCCCCCCCCCCC");
        assert_eq!(lines[4], "DDDDDDDDDDDD");
    }

    #[test]
    fn test_unscramble_label_column_order() {
        let mut raw = vec![b' '; 12];
        for col in 0..12u8 {
            raw.extend_from_slice(&[b'a' + col, b' ', b' ', b' ']);
        }
        let lines = unscramble_label(&raw);
        assert_eq!(lines[1], "abcdefghijkl");
        assert_eq!(lines[2].trim(), "");
    }

    #[test]
    fn test_unscramble_label_replaces_control_bytes() {
        let mut raw = vec![0u8; 60];
        raw[0] = 0x07;
        let lines = unscramble_label(&raw);
        assert!(lines[0].starts_with('\u{FFFD}'));
        assert_eq!(lines[1], " ".repeat(12));
    }
}
