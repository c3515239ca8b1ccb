/// WAV file writer for extracted tones
///
/// Output is plain 16-bit PCM RIFF/WAVE at the tone's native rate, which
/// any external player accepts.

use crate::error::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Bits per sample of written WAV data
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Size of the RIFF, fmt and data headers
pub const WAV_HEADER_SIZE: usize = 44;

/// Write a WAV stream for 16-bit little endian PCM
pub fn write_wav<W: Write>(
    writer: &mut W,
    sample_rate: u32,
    channels: u16,
    pcm: &[u8],
) -> std::io::Result<()> {
    let block_align = channels * WAV_BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = pcm.len() as u32;

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(36 + data_len)?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(1)?; // PCM
    writer.write_u16::<LittleEndian>(channels)?;
    writer.write_u32::<LittleEndian>(sample_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(WAV_BITS_PER_SAMPLE)?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_len)?;
    writer.write_all(pcm)?;

    Ok(())
}

/// Encode a complete WAV file in memory
pub fn encode_wav(sample_rate: u32, channels: u16, pcm: &[u8]) -> Result<Vec<u8>> {
    let mut wav = Vec::with_capacity(WAV_HEADER_SIZE + pcm.len());
    write_wav(&mut wav, sample_rate, channels, pcm)?;
    Ok(wav)
}

/// Write a WAV file to disk
pub fn save_wav<P: AsRef<Path>>(path: P, sample_rate: u32, channels: u16, pcm: &[u8]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(&path)?);
    write_wav(&mut writer, sample_rate, channels, pcm)?;
    writer.flush()?;
    log::info!("Wrote {} bytes of PCM to {}", pcm.len(), path.as_ref().display());
    Ok(())
}
