/// Interactive sampler disk console application

use samplerdisk::map::draw_wave_map;
use samplerdisk::report::{disk_report, save_report};
use samplerdisk::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Command completer for the REPL
struct CommandCompleter {
    commands: Vec<&'static str>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: vec![
                "cat", "dir", "exit", "export", "help", "hex", "info", "label", "list", "load",
                "ls", "map", "open", "patches", "quit", "raw", "report", "tone", "trim",
            ],
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete the first word (command name)
        let line_to_cursor = &line[..pos];
        if line_to_cursor.contains(' ') {
            return Ok((pos, vec![]));
        }

        let prefix = line_to_cursor.to_lowercase();
        let matches: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Get the path to the history file
fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".samplerdisk_history");
        p
    })
}

fn main() {
    env_logger::init();

    println!("=== SamplerDisk ===");
    println!("Interactive console for exploring sampler disk images.");
    println!("Type 'help' for available commands\n");

    let mut rl: Editor<CommandCompleter, _> = match Editor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create editor: {}", e);
            std::process::exit(1);
        }
    };
    rl.set_helper(Some(CommandCompleter::new()));

    if let Some(history_path) = history_path() {
        let _ = rl.load_history(&history_path);
    }

    let mut catalog: Option<DiskCatalog> = None;
    let mut options = ExtractOptions::default();

    // An image path on the command line is opened straight away
    if let Some(path) = std::env::args().nth(1) {
        catalog = open_catalog(&path);
    }

    loop {
        let input = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let _ = rl.add_history_entry(input);

        let parts = parse_command_line(input);
        if parts.is_empty() {
            continue;
        }
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "help" => print_help(),
            "quit" | "exit" => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            "open" | "load" => {
                if parts.len() < 2 {
                    println!("Usage: open <path>");
                    continue;
                }
                if let Some(opened) = open_catalog(&parts[1]) {
                    catalog = Some(opened);
                }
            }
            "trim" => match parts.get(1).map(|s| s.to_lowercase()).as_deref() {
                Some("on") => options.trim_to_end_point = true,
                Some("off") => options.trim_to_end_point = false,
                None => {}
                Some(_) => println!("Usage: trim [on|off]"),
            },
            _ => {
                let Some(ref cat) = catalog else {
                    println!("No image loaded. Use 'open <path>' first.");
                    continue;
                };
                run_catalog_command(cat, &command, &parts, &options);
            }
        }

        if command == "trim" {
            println!(
                "Trim to end point: {}",
                if options.trim_to_end_point { "on" } else { "off" }
            );
        }
    }
}

/// Commands that need an open image
fn run_catalog_command(catalog: &DiskCatalog, command: &str, parts: &[String], options: &ExtractOptions) {
    match command {
        "info" => print_info(catalog),
        "list" | "ls" | "dir" | "cat" => {
            let show_all = parts.get(1).is_some_and(|p| p == "all");
            list_tones(catalog, show_all);
        }
        "tone" => {
            let Some(index) = parts.get(1).and_then(|r| resolve_tone(catalog, r)) else {
                println!("Usage: tone <index|I11-I48|name>");
                return;
            };
            print_tone(catalog, index);
        }
        "patches" => list_patches(catalog),
        "label" => {
            for line in &catalog.volume().label {
                println!("{}", line.trim_end());
            }
        }
        "map" => draw_wave_map(catalog),
        "report" => match parts.get(1) {
            Some(path) => match save_report(catalog, path) {
                Ok(()) => println!("Report written to {}", path),
                Err(e) => println!("Error: {}", e),
            },
            None => print!("{}", disk_report(catalog)),
        },
        "export" | "raw" => {
            let Some(index) = parts.get(1).and_then(|r| resolve_tone(catalog, r)) else {
                println!("Usage: {} <index|I11-I48|name> [output_path]", command);
                return;
            };
            let raw = command == "raw";
            let default_name = catalog
                .entry(index)
                .map(|e| default_export_name(e, raw))
                .unwrap_or_default();
            let output_path = parts.get(2).cloned().unwrap_or(default_name);
            export_tone(catalog, index, &output_path, raw, options);
        }
        "hex" => {
            let Some(offset) = parts.get(1).and_then(|s| parse_hex_or_dec(s)) else {
                println!("Usage: hex <offset> [length]");
                return;
            };
            let length = parts.get(2).and_then(|s| parse_hex_or_dec(s)).unwrap_or(256);
            match catalog.image().reader().read(offset, length) {
                Ok(data) => {
                    println!("Offset {:#07X} ({} bytes):", offset, data.len());
                    print_hex_dump(data, length, offset);
                }
                Err(e) => println!("Error: {}", e),
            }
        }
        _ => println!("Unknown command: '{}'. Type 'help' for available commands.", command),
    }
}

fn open_catalog(path: &str) -> Option<DiskCatalog> {
    match DiskCatalog::open(path) {
        Ok(catalog) => {
            println!(
                "Opened: {} ({} disk, {} tones)",
                path,
                catalog.format(),
                catalog.valid_entries().count()
            );
            Some(catalog)
        }
        Err(e) => {
            println!("Error: {}", e);
            None
        }
    }
}

/// Parse command line input, respecting quoted strings
fn parse_command_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

/// Resolve a tone reference: slot index, Roland number or name
fn resolve_tone(catalog: &DiskCatalog, reference: &str) -> Option<usize> {
    if let Ok(index) = reference.parse::<usize>() {
        return (index < catalog.count()).then_some(index);
    }

    let upper = reference.to_ascii_uppercase();
    if let Some(digits) = upper.strip_prefix('I') {
        let bytes = digits.as_bytes();
        if bytes.len() == 2 && (b'1'..=b'4').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1]) {
            let index = (bytes[0] - b'1') as usize * 8 + (bytes[1] - b'1') as usize;
            return (index < catalog.count()).then_some(index);
        }
    }

    catalog.find(reference).map(|e| e.index)
}

fn default_export_name(entry: &CatalogEntry, raw: bool) -> String {
    let name: String = entry
        .name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let ext = if raw { "raw" } else { "wav" };
    if name.is_empty() {
        format!("{}.{}", entry.roland_number(), ext)
    } else {
        format!("{}_{}.{}", entry.roland_number(), name, ext)
    }
}

fn export_tone(catalog: &DiskCatalog, index: usize, output_path: &str, raw: bool, options: &ExtractOptions) {
    if raw {
        let result = catalog
            .extract_with(index, options)
            .and_then(|payload| std::fs::write(output_path, &payload.raw).map(|_| payload).map_err(DiskError::from));
        match result {
            Ok(payload) => println!("Exported {} raw bytes to {}", payload.raw_len(), output_path),
            Err(e) => println!("Error: {}", e),
        }
    } else {
        match catalog.export_wav(index, output_path, options) {
            Ok(payload) => println!(
                "Exported {} ({} samples at {} Hz, {:.2}s) to {}",
                payload.name.trim(),
                payload.samples.len(),
                payload.sample_rate,
                payload.duration_secs(),
                output_path
            ),
            Err(e) => println!("Error: {}", e),
        }
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  open <path>                    - Open a disk image file (use quotes for paths with spaces)");
    println!("  info                           - Show disk information");
    println!("  list [all]                     - List tones (all includes empty and invalid slots)");
    println!("  tone <ref>                     - Show tone parameters (index, I11-I48 or name)");
    println!("  patches                        - List patches and the tones they use");
    println!("  label                          - Show the disk label");
    println!("  map                            - Visual wave memory map (white=tone, yellow=shared)");
    println!("  report [output_path]           - Show or save the full parameter report");
    println!("  export <ref> [output_path]     - Export tone as a WAV file");
    println!("  raw <ref> [output_path]        - Export tone wave data as stored on disk");
    println!("  hex <offset> [length]          - Hex dump image bytes (decimal or 0x hex)");
    println!("  trim [on|off]                  - Show or set trimming exports at the tone end point");
    println!("  help                           - Show this help");
    println!("  quit, exit                     - Exit");
}

fn print_info(catalog: &DiskCatalog) {
    let image = catalog.image();
    let volume = catalog.volume();

    if let Some(filename) = image.filename() {
        println!("Filename: {}", filename);
    }
    println!("Format: {}", catalog.format());
    println!(
        "Image size: {} bytes{}",
        image.len(),
        if image.has_nominal_size() { "" } else { " (unexpected)" }
    );
    if let Some(version) = &volume.system_version {
        println!("System: {}", version.trim());
    }
    println!("Title: {}", volume.title());
    println!(
        "Tones: {} of {} slots",
        catalog.valid_entries().count(),
        catalog.count()
    );
    println!("Patches: {}", catalog.patches().len());
    println!("Master tune: {}", volume.function.master_tune);
    println!("Voice mode: {}", volume.function.voice_mode_name());
    println!(
        "Wave memory: {} of {} segments used, {} KB free",
        volume.usage.used_segments,
        volume.usage.total_segments,
        volume.usage.free_bytes() / 1024
    );
}

fn list_tones(catalog: &DiskCatalog, show_all: bool) {
    println!(
        "{:<4} {:<8} {:>6} {:>7} {:<5} {:<4} {:<7} {:>5} {}",
        "No", "Name", "Rate", "Bytes", "Segs", "Key", "Loop", "Level", "Status"
    );
    println!("{}", "-".repeat(64));

    let mut shown = 0;
    for entry in catalog.entries() {
        if !show_all && !entry.is_valid() {
            continue;
        }
        shown += 1;

        let rate = entry
            .sample_rate()
            .map(|r| format!("{}k", r / 1000))
            .unwrap_or_else(|| "?".to_string());
        let segments = if entry.segment_length == 0 {
            "-".to_string()
        } else {
            format!(
                "{}{}+{}",
                entry.bank_letter(catalog.layout()),
                entry.segment_top as usize + 1,
                entry.segment_length
            )
        };
        let status = match entry.invalid_reason() {
            None if entry.sub_tone => format!("sub of {}", roland_number(entry.source_tone as usize)),
            None => String::new(),
            Some(reason) => reason.to_string(),
        };

        println!(
            "{:<4} {:<8} {:>6} {:>7} {:<5} {:<4} {:<7} {:>5} {}",
            entry.roland_number(),
            entry.name,
            rate,
            entry.length(),
            segments,
            note_name(entry.original_key),
            entry.loop_mode.to_string(),
            entry.level,
            status
        );
    }

    if shown == 0 {
        println!("No tones found.");
    }
}

fn print_tone(catalog: &DiskCatalog, index: usize) {
    let Some(entry) = catalog.entry(index) else {
        println!("Error: {}", DiskError::EntryNotFound(index));
        return;
    };

    println!("Tone {} (slot {})", entry.roland_number(), entry.index);
    println!("  Name: {}", entry.name);
    match entry.invalid_reason() {
        Some(reason) => println!("  Status: invalid ({})", reason),
        None => println!("  Status: valid"),
    }
    match entry.sample_rate() {
        Some(rate) => println!("  Rate: {} Hz", rate),
        None => println!("  Rate: unknown (code {})", entry.rate_code),
    }
    println!("  Format: {}-bit, {} channel", entry.bits_per_sample, entry.channels);
    println!(
        "  Wave bank: {}, segment {} for {}",
        entry.wave_bank, entry.segment_top, entry.segment_length
    );
    match &entry.location {
        Location::Contiguous { offset, length } => {
            println!("  Location: {:#07X}, {} bytes", offset, length)
        }
        Location::Fragmented { segments, segment_size } => {
            println!("  Location: {} segments of {} bytes", segments.len(), segment_size)
        }
    }
    println!(
        "  Points: start {}, end {}, loop {}",
        entry.start_point, entry.end_point, entry.loop_point
    );
    println!("  Loop mode: {}", entry.loop_mode);
    println!("  Original key: {} ({})", note_name(entry.original_key), entry.original_key);
    println!("  Level: {}", entry.level);
    println!("  Fine tune: {}", entry.fine_tune);
    if entry.sub_tone {
        println!("  Sub tone of: {}", roland_number(entry.source_tone as usize));
    }
}

fn list_patches(catalog: &DiskCatalog) {
    if catalog.patches().is_empty() {
        println!("No patches found.");
        return;
    }

    println!("{:<3} {:<12} {:<8} {:>5} {}", "No", "Name", "Mode", "Level", "Tones");
    println!("{}", "-".repeat(64));
    for patch in catalog.patches() {
        let tones: Vec<String> = patch.tones.iter().map(|&t| roland_number(t)).collect();
        println!(
            "{:<3} {:<12} {:<8} {:>5} {}",
            patch.index + 1,
            patch.name,
            patch.key_mode_name(),
            patch.output_level,
            tones.join(" ")
        );
    }
}

fn print_hex_dump(data: &[u8], max_bytes: usize, base: usize) {
    let len = data.len().min(max_bytes);

    for (i, chunk) in data[..len].chunks(16).enumerate() {
        print!("{:06X}: ", base + i * 16);

        // Print hex
        for (j, byte) in chunk.iter().enumerate() {
            print!("{:02X} ", byte);
            if j == 7 {
                print!(" ");
            }
        }

        // Pad if less than 16 bytes
        for j in chunk.len()..16 {
            print!("   ");
            if j == 7 {
                print!(" ");
            }
        }

        print!(" |");

        // Print ASCII
        for byte in chunk {
            let c = if *byte >= 32 && *byte < 127 {
                *byte as char
            } else {
                '.'
            };
            print!("{}", c);
        }

        println!("|");
    }

    if data.len() > max_bytes {
        println!("... ({} more bytes)", data.len() - max_bytes);
    }
}

fn parse_hex_or_dec(s: &str) -> Option<usize> {
    if s.starts_with("0x") || s.starts_with("0X") {
        usize::from_str_radix(&s[2..], 16).ok()
    } else {
        s.parse().ok()
    }
}
