/// Tone payload extraction
///
/// Wave data is stored as 12-bit mono samples packed two to three bytes.
/// For bytes `b0 b1 b2`:
/// - first sample:  `b0` and the high nibble of `b1`
/// - second sample: `b2` and the low nibble of `b1`
///
/// Each sample is shifted left 4 bits into a signed 16-bit value.

use crate::catalog::{CatalogEntry, InvalidReason, Location};
use crate::error::{DiskError, Result};
use crate::format::PACKED_PAIR_SIZE;
use crate::image::ByteReader;
use crate::io::wav::{encode_wav, save_wav};
use std::path::Path;

/// Options controlling extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Stop at the tone's end point instead of the end of its last segment
    ///
    /// Samples are kept in whole pairs, stopping before the pair whose count
    /// reaches the end point, so an end point of 7 or 8 keeps 6 samples and
    /// an end point of 0 keeps none.
    pub trim_to_end_point: bool,
}

/// Extracted sample data, independent of the source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePayload {
    /// Tone slot the payload came from
    pub index: usize,
    /// Tone name
    pub name: String,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Native bits per sample on disk
    pub source_bits: u8,
    /// Exact bytes of the declared extent
    pub raw: Vec<u8>,
    /// Normalized signed 16-bit samples
    pub samples: Vec<i16>,
}

impl SamplePayload {
    /// Length of the raw extent in bytes
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    /// Play time in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.channels.max(1) as f64 / self.sample_rate as f64
    }

    /// Samples as little endian 16-bit PCM bytes
    pub fn pcm_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Encode as a WAV file at the native sample rate
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        encode_wav(self.sample_rate, self.channels, &self.pcm_le_bytes())
    }

    /// Write a WAV file at the native sample rate
    pub fn save_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_wav(path, self.sample_rate, self.channels, &self.pcm_le_bytes())
    }
}

/// Unpack 12-bit sample pairs into 16-bit samples
///
/// A trailing partial pair is dropped.
pub fn unpack_12bit(data: &[u8]) -> Vec<i16> {
    let mut samples = Vec::with_capacity(data.len() / PACKED_PAIR_SIZE * 2);
    for chunk in data.chunks_exact(PACKED_PAIR_SIZE) {
        let a = ((chunk[0] as u16) << 8) | (chunk[1] as u16 & 0xF0);
        let b = ((chunk[2] as u16) << 8) | ((chunk[1] as u16 & 0x0F) << 4);
        samples.push(a as i16);
        samples.push(b as i16);
    }
    if data.len() % PACKED_PAIR_SIZE != 0 {
        log::debug!(
            "Dropping {} trailing bytes of partial sample pair",
            data.len() % PACKED_PAIR_SIZE
        );
    }
    samples
}

/// Samples kept when trimming at an end point
fn trimmed_len(end_point: u32) -> usize {
    let end = end_point as usize;
    end.saturating_sub(1) / 2 * 2
}

/// Extract one tone's payload from the image
///
/// Fails with `UnsupportedPayloadLayout` for fragmented storage. An empty
/// slot then fails with `InvalidEntry` whatever its stale extent says.
/// Otherwise an extent past the image is `TruncatedPayload` and any other
/// flagged entry is `InvalidEntry`.
pub fn extract(
    reader: &ByteReader<'_>,
    entry: &CatalogEntry,
    options: &ExtractOptions,
) -> Result<SamplePayload> {
    let (offset, length) = match entry.location {
        Location::Contiguous { offset, length } => (offset, length),
        Location::Fragmented { .. } => {
            return Err(DiskError::UnsupportedPayloadLayout(entry.index));
        }
    };

    if entry.invalid_reason() == Some(InvalidReason::EmptySlot) {
        return Err(DiskError::InvalidEntry {
            index: entry.index,
            reason: InvalidReason::EmptySlot,
        });
    }

    let raw = reader.read(offset, length).map_err(|_| DiskError::TruncatedPayload {
        index: entry.index,
        end: offset.saturating_add(length),
        size: reader.len(),
    })?;

    if let Some(reason) = entry.invalid_reason() {
        return Err(DiskError::InvalidEntry {
            index: entry.index,
            reason,
        });
    }

    let sample_rate = entry.sample_rate().ok_or(DiskError::InvalidEntry {
        index: entry.index,
        reason: InvalidReason::BadSampleRate(entry.rate_code),
    })?;

    let mut samples = unpack_12bit(raw);
    if options.trim_to_end_point {
        samples.truncate(trimmed_len(entry.end_point));
    }

    log::debug!(
        "Extracted tone {} ({}): {} bytes at {}, {} samples at {} Hz",
        entry.index,
        entry.name,
        length,
        offset,
        samples.len(),
        sample_rate
    );

    Ok(SamplePayload {
        index: entry.index,
        name: entry.name.clone(),
        sample_rate,
        channels: entry.channels as u16,
        source_bits: entry.bits_per_sample,
        raw: raw.to_vec(),
        samples,
    })
}
