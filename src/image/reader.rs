/// Bounds-checked random access over an image buffer
///
/// Every catalog and payload read goes through a `ByteReader`, so a bad
/// offset in a directory slot surfaces as `DiskError::OutOfBounds` instead
/// of a panic.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{DiskError, Result};

/// Read-only view over a byte buffer
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Create a reader over a buffer
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Size of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Is the underlying buffer empty?
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Does `length` bytes at `offset` lie inside the buffer?
    pub fn contains(&self, offset: usize, length: usize) -> bool {
        offset
            .checked_add(length)
            .map(|end| end <= self.data.len())
            .unwrap_or(false)
    }

    /// Read `length` bytes starting at `offset`
    pub fn read(&self, offset: usize, length: usize) -> Result<&'a [u8]> {
        if !self.contains(offset, length) {
            return Err(DiskError::OutOfBounds {
                offset,
                length,
                size: self.data.len(),
            });
        }
        Ok(&self.data[offset..offset + length])
    }

    /// Bounds-checked window over part of the buffer
    pub fn sub(&self, offset: usize, length: usize) -> Result<ByteReader<'a>> {
        self.read(offset, length).map(ByteReader::new)
    }

    /// Read an unsigned byte
    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.read(offset, 1)?[0])
    }

    /// Read a signed byte
    pub fn i8(&self, offset: usize) -> Result<i8> {
        Ok(self.u8(offset)? as i8)
    }

    /// Read a big endian u16
    pub fn u16_be(&self, offset: usize) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read(offset, 2)?))
    }

    /// Read a little endian u16
    pub fn u16_le(&self, offset: usize) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read(offset, 2)?))
    }

    /// Read a big endian 24-bit value (Roland loop/start/end points)
    pub fn u24_be(&self, offset: usize) -> Result<u32> {
        Ok(BigEndian::read_u24(self.read(offset, 3)?))
    }

    /// Read a big endian u32
    pub fn u32_be(&self, offset: usize) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read(offset, 4)?))
    }

    /// Read a little endian u32
    pub fn u32_le(&self, offset: usize) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read(offset, 4)?))
    }

    /// Read a fixed number of bytes into an array
    pub fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(offset, N)?);
        Ok(out)
    }

    /// Read a fixed-width ASCII field
    ///
    /// Bytes outside 7-bit ASCII are replaced with U+FFFD. No trimming is done.
    pub fn fixed_str(&self, offset: usize, length: usize) -> Result<String> {
        Ok(self
            .read(offset, length)?
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_read_in_bounds() {
        let data = [1u8, 2, 3, 4, 5];
        let reader = ByteReader::new(&data);
        assert_eq!(reader.read(1, 3).unwrap(), &[2, 3, 4]);
        assert_eq!(reader.read(5, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_read_out_of_bounds() {
        let data = [0u8; 8];
        let reader = ByteReader::new(&data);
        let result = reader.read(6, 4);
        assert!(matches!(
            result,
            Err(DiskError::OutOfBounds {
                offset: 6,
                length: 4,
                size: 8
            })
        ));
    }

    #[test]
    fn test_read_overflowing_range() {
        let data = [0u8; 8];
        let reader = ByteReader::new(&data);
        assert!(reader.read(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_typed_reads() {
        let data = [0x12, 0x34, 0x56, 0x78, 0xFF];
        let reader = ByteReader::new(&data);
        assert_eq!(reader.u16_be(0).unwrap(), 0x1234);
        assert_eq!(reader.u16_le(0).unwrap(), 0x3412);
        assert_eq!(reader.u24_be(0).unwrap(), 0x123456);
        assert_eq!(reader.u32_be(0).unwrap(), 0x12345678);
        assert_eq!(reader.u32_le(0).unwrap(), 0x78563412);
        assert_eq!(reader.i8(4).unwrap(), -1);
        assert!(reader.u32_be(2).is_err());
    }

    #[test]
    fn test_array() {
        let data = [9u8, 8, 7, 6];
        let reader = ByteReader::new(&data);
        assert_eq!(reader.array::<3>(1).unwrap(), [8, 7, 6]);
        assert!(reader.array::<4>(1).is_err());
    }

    #[test]
    fn test_fixed_str() {
        let data = *b"KICK1   \xE5";
        let reader = ByteReader::new(&data);
        assert_eq!(reader.fixed_str(0, 8).unwrap(), "KICK1   ");
        assert_eq!(reader.fixed_str(8, 1).unwrap(), "\u{FFFD}");
    }

    #[test]
    fn test_sub_reader() {
        let data = [0u8, 1, 2, 3, 4, 5];
        let reader = ByteReader::new(&data);
        let sub = reader.sub(2, 3).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.u8(0).unwrap(), 2);
        assert!(sub.u8(3).is_err());
    }

    proptest! {
        #[test]
        fn read_never_panics(data in proptest::collection::vec(any::<u8>(), 0..64),
                             offset in any::<usize>(),
                             length in 0usize..128) {
            let reader = ByteReader::new(&data);
            match reader.read(offset, length) {
                Ok(bytes) => prop_assert_eq!(bytes.len(), length),
                Err(DiskError::OutOfBounds { .. }) => prop_assert!(!reader.contains(offset, length)),
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }
}
