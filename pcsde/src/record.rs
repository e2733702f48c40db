//! Fixed-size, obfuscated table records

use crate::key::Key;
use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;

/// A single 128-byte entry of a directory or song table
///
/// Every record in a song bank is stored obfuscated: byte `j` of the record has had
/// `key[j mod 32]` added to it (modulo 256). The mask restarts at the start of every record,
/// it does not run on across the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    bytes: [u8; Self::LEN],
}

impl Record {
    /// The length in bytes of every record
    pub const LEN: usize = 0x80;

    /// Wrap raw record bytes
    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self { bytes }
    }

    /// Copy the record stored at `offset` out of a buffer
    ///
    /// Returns [`None`] if the record doesn't fit in the buffer.
    pub fn read(buffer: &[u8], offset: usize) -> Option<Self> {
        let end = offset.checked_add(Self::LEN)?;
        let bytes = buffer.get(offset..end)?.try_into().ok()?;

        Some(Self { bytes })
    }

    /// The byte range a record occupies in a table
    ///
    /// Returns [`None`] if that range can't be represented on this platform.
    pub fn range(table_offset: usize, index: usize) -> Option<Range<usize>> {
        let start = index
            .checked_mul(Self::LEN)
            .and_then(|offset| offset.checked_add(table_offset))?;
        let end = start.checked_add(Self::LEN)?;

        Some(start..end)
    }

    /// Remove the key mask, yielding the plain record
    pub fn deobfuscate(&self, key: &Key) -> Self {
        let mut bytes = self.bytes;
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = byte.wrapping_sub(key.mask(index));
        }

        Self { bytes }
    }

    /// Apply the key mask to a plain record
    ///
    /// This is the inverse of [`Record::deobfuscate()`].
    pub fn obfuscate(&self, key: &Key) -> Self {
        let mut bytes = self.bytes;
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = byte.wrapping_add(key.mask(index));
        }

        Self { bytes }
    }

    /// Access the underlying bytes
    pub fn bytes(&self) -> &[u8; Self::LEN] {
        &self.bytes
    }

    /// Read a little-endian `u32` field at `offset` within the record
    ///
    /// # Panics
    ///
    /// Panics if the field runs past the end of the record.
    pub fn u32_at(&self, offset: usize) -> u32 {
        LittleEndian::read_u32(&self.bytes[offset..offset + 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Key {
        let mut bytes = [0; Key::LEN];
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = 0xA5u8.wrapping_mul(index as u8 + 1);
        }
        Key::new(bytes)
    }

    fn record() -> Record {
        let mut bytes = [0; Record::LEN];
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = 0xFFu8.wrapping_sub(index as u8 * 2);
        }
        Record::new(bytes)
    }

    #[test]
    fn obfuscation_round_trip() {
        let key = key();
        let record = record();

        assert_eq!(record.deobfuscate(&key).obfuscate(&key), record);
        assert_eq!(record.obfuscate(&key).deobfuscate(&key), record);
    }

    #[test]
    fn mask_restarts_every_32_bytes() {
        let key = key();
        let plain = Record::new([0; Record::LEN]);
        let masked = plain.obfuscate(&key);

        for chunk in masked.bytes().chunks(Key::LEN) {
            assert_eq!(chunk, key.bytes());
        }
    }

    #[test]
    fn zero_key_is_identity() {
        let key = Key::new([0; Key::LEN]);
        assert_eq!(record().deobfuscate(&key), record());
    }

    #[test]
    fn deobfuscation_wraps() {
        let key = Key::new([0x10; Key::LEN]);
        let record = Record::new([0x05; Record::LEN]);
        assert!(record.deobfuscate(&key).bytes().iter().all(|byte| *byte == 0xF5));
    }

    #[test]
    fn read() {
        let mut buffer = vec![0; 0x100];
        buffer[0x20..0xA0].copy_from_slice(record().bytes());

        assert_eq!(Record::read(&buffer, 0x20), Some(record()));
        assert!(Record::read(&buffer, 0x80).is_some());
        assert!(Record::read(&buffer, 0x81).is_none());
        assert!(Record::read(&buffer, usize::MAX).is_none());
    }

    #[test]
    fn range() {
        assert_eq!(Record::range(0x500, 0), Some(0x500..0x580));
        assert_eq!(Record::range(0x500, 3), Some(0x680..0x700));
        assert_eq!(Record::range(usize::MAX, 1), None);
    }

    #[test]
    fn u32_fields_are_little_endian() {
        let mut bytes = [0; Record::LEN];
        bytes[0x78..0x7C].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(Record::new(bytes).u32_at(0x78), 0x0403_0201);
    }
}
