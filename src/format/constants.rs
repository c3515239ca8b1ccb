/// Disk geometry and block offsets shared by the 12-bit sampler family

/// Nominal image size: 80 tracks, 2 sides, 9 sectors of 512 bytes
pub const IMAGE_SIZE: usize = 737_280;

/// Largest file accepted by `DiskImage::open`
pub const MAX_IMAGE_FILE_SIZE: usize = 2_000_000;

/// Offset of the 4-byte format signature
pub const SIGNATURE_OFFSET: usize = 4;

/// Length of the format signature
pub const SIGNATURE_LEN: usize = 4;

/// Size of the system program area at the start of the disk
pub const SYSTEM_SIZE: usize = 64_512;

/// Offset of the system version string
pub const VERSION_OFFSET: usize = 32;

/// Length of the version string, excluding its end marker
pub const VERSION_LEN: usize = 31;

/// Offset of the patch table
pub const PATCHES_OFFSET: usize = 64_512;

/// Offset of the function parameter block
pub const FUNCTION_OFFSET: usize = 68_608;

/// Size of the function parameter block
pub const FUNCTION_SIZE: usize = 224;

/// Offset of the disk label inside the function block
pub const LABEL_FIELD_OFFSET: usize = 51;

/// Raw disk label length
pub const LABEL_LEN: usize = 60;

/// Offset of the MIDI parameter block
pub const MIDI_OFFSET: usize = 68_832;

/// Size of the MIDI parameter block
pub const MIDI_SIZE: usize = 288;

/// Parts in a multi-timbral parameter array
pub const MULTI_PARTS: usize = 8;

/// MIDI channel value meaning "not receiving"
pub const MIDI_CHANNEL_OFF: u8 = 16;

/// Offset of the tone table
pub const TONES_OFFSET: usize = 69_120;

/// Size of one tone record
pub const TONE_SIZE: usize = 128;

/// Number of tone slots on a disk
pub const TONE_COUNT: usize = 32;

/// Offset of the wave data block
pub const WAVE_OFFSET: usize = 73_728;

/// Bytes per wave segment
pub const SEGMENT_SIZE: usize = 18_432;

/// Segments per wave bank
pub const SEGMENTS_PER_BANK: usize = 18;

/// Wave banks (A and B)
pub const BANK_COUNT: usize = 2;

/// Bytes per wave bank
pub const BANK_SIZE: usize = SEGMENT_SIZE * SEGMENTS_PER_BANK;

/// Total wave segments on a disk
pub const WAVE_SEGMENTS: usize = SEGMENTS_PER_BANK * BANK_COUNT;

/// Wave bank value used by empty tone slots
pub const WAVE_BANK_NONE: u8 = 2;

/// Bytes per packed pair of 12-bit samples
pub const PACKED_PAIR_SIZE: usize = 3;

/// Native sample width of the wave data
pub const SAMPLE_BITS: u8 = 12;

/// Sample rate for rate code 0
pub const RATE_30K: u32 = 30_000;

/// Sample rate for rate code 1
pub const RATE_15K: u32 = 15_000;
