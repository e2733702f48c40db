//! The per-directory song tables

use crate::{
    key::Key,
    name::{FromBytesError, Name},
    record::Record,
};
use thiserror::Error;
use tracing::debug;

/// A single recording, decoded from one song record
///
/// After de-obfuscation, a song record is laid out as follows:
///
/// | Bytes        | Field                                   |
/// |--------------|-----------------------------------------|
/// | `0x00..0x40` | NUL-padded GBK name                     |
/// | `0x40..0x44` | Absolute offset of the song payload     |
/// | `0x44..0x48` | Length in bytes of the song payload     |
/// | `0x48..0x80` | Reserved                                |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongEntry {
    name: [u8; Self::NAME_LEN],

    /// The absolute offset of the song payload in the bank
    pub song_offset: u32,

    /// The length in bytes of the song payload
    pub song_length: u32,
}

impl SongEntry {
    /// The capacity of the name field
    pub const NAME_LEN: usize = 0x40;

    /// The file extension recovered songs are written with
    ///
    /// Song payloads are stored as plain Standard MIDI Files.
    pub const EXTENSION: &'static str = "mid";

    const SONG_OFFSET_OFFSET: usize = 0x40;
    const SONG_LENGTH_OFFSET: usize = 0x44;

    /// Interpret a (de-obfuscated) song record
    pub fn from_record(record: &Record) -> Self {
        let mut name = [0; Self::NAME_LEN];
        name.copy_from_slice(&record.bytes()[..Self::NAME_LEN]);

        Self {
            name,
            song_offset: record.u32_at(Self::SONG_OFFSET_OFFSET),
            song_length: record.u32_at(Self::SONG_LENGTH_OFFSET),
        }
    }

    /// Decode the song's name
    pub fn name(&self) -> Result<Name<{ SongEntry::NAME_LEN }>, FromBytesError> {
        Name::from_bytes(&self.name)
    }

    /// Access the raw (de-obfuscated) name field
    pub fn name_bytes(&self) -> &[u8; Self::NAME_LEN] {
        &self.name
    }
}

/// Decode the song table of a single directory
///
/// `table_length` is the length of the table in bytes, which has to be a whole number of
/// records. Like the directory table, the table is rejected as a whole if any of its
/// records lies (partly) outside the buffer.
pub fn read_files(
    buffer: &[u8],
    key: &Key,
    table_offset: u32,
    table_length: u32,
) -> Result<Vec<SongEntry>, ReadFilesError> {
    if table_length as usize % Record::LEN != 0 {
        return Err(ReadFilesError::MisalignedFileTable {
            length: table_length,
        });
    }

    let truncated = || ReadFilesError::TruncatedFileTable {
        offset: table_offset,
        length: table_length.into(),
        len: buffer.len(),
    };

    let count = table_length as usize / Record::LEN;
    // An empty table is never read, so its offset doesn't matter
    let fits = count == 0
        || (table_offset as usize)
            .checked_add(table_length as usize)
            .is_some_and(|end| end <= buffer.len());
    if !fits {
        return Err(truncated());
    }

    let mut songs = Vec::with_capacity(count);
    for index in 0..count {
        let range = Record::range(table_offset as usize, index).ok_or_else(truncated)?;
        let record = Record::read(buffer, range.start).ok_or_else(truncated)?;

        let song = SongEntry::from_record(&record.deobfuscate(key));
        debug!(
            index,
            song_offset = song.song_offset,
            song_length = song.song_length,
            "decoded song record"
        );

        songs.push(song);
    }

    Ok(songs)
}

/// Errors that might be returned from [`read_files()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadFilesError {
    /// The table length isn't a whole number of records, which means it's corrupt
    #[error("The song table length ({length} bytes) is not a multiple of the record length")]
    MisalignedFileTable { length: u32 },

    /// The declared song records run past the end of the buffer
    #[error("The song table at {offset:#X} ({length} bytes) runs past the end of the buffer ({len} bytes)")]
    TruncatedFileTable { offset: u32, length: u64, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};

    fn key() -> Key {
        let mut bytes = [0; Key::LEN];
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = (index as u8).wrapping_mul(0x1D) ^ 0x5A;
        }
        Key::new(bytes)
    }

    fn plain_record(name: &[u8], song_offset: u32, song_length: u32) -> Record {
        let mut bytes = [0xEE; Record::LEN];
        bytes[..SongEntry::NAME_LEN].fill(0);
        bytes[..name.len()].copy_from_slice(name);
        LittleEndian::write_u32(&mut bytes[0x40..0x44], song_offset);
        LittleEndian::write_u32(&mut bytes[0x44..0x48], song_length);
        Record::new(bytes)
    }

    fn table(key: &Key, offset: usize, records: &[Record]) -> Vec<u8> {
        let mut buffer = vec![0; offset + records.len() * Record::LEN];
        for (index, record) in records.iter().enumerate() {
            let start = offset + index * Record::LEN;
            buffer[start..start + Record::LEN].copy_from_slice(record.obfuscate(key).bytes());
        }
        buffer
    }

    #[test]
    fn read() {
        let key = key();
        let buffer = table(
            &key,
            0x600,
            &[
                plain_record(b"Twinkle", 0x1000, 0x20),
                plain_record(b"Lullaby\0\0\0\0", 0x1020, 0x44),
            ],
        );

        let songs = read_files(&buffer, &key, 0x600, 2 << 7).unwrap();
        assert_eq!(songs.len(), 2);

        assert_eq!(songs[0].name().unwrap().as_str(), "Twinkle");
        assert_eq!(songs[0].song_offset, 0x1000);
        assert_eq!(songs[0].song_length, 0x20);

        assert_eq!(songs[1].name().unwrap().as_str(), "Lullaby");
        assert_eq!(songs[1].song_offset, 0x1020);
        assert_eq!(songs[1].song_length, 0x44);
    }

    #[test]
    fn reserved_bytes_are_ignored() {
        let key = key();
        let mut record = plain_record(b"Minuet", 1, 2);
        let mut bytes = *record.bytes();
        bytes[0x48..].fill(0x42);
        record = Record::new(bytes);

        let buffer = table(&key, 0, &[record]);
        let songs = read_files(&buffer, &key, 0, 0x80).unwrap();
        assert_eq!(songs[0].song_offset, 1);
        assert_eq!(songs[0].song_length, 2);
    }

    #[test]
    fn empty_table() {
        assert_eq!(read_files(&[], &key(), 0x1234, 0), Ok(Vec::new()));
    }

    #[test]
    fn misaligned() {
        let key = key();
        let buffer = table(&key, 0, &[plain_record(b"A", 0, 0)]);
        assert_eq!(
            read_files(&buffer, &key, 0, 0x81),
            Err(ReadFilesError::MisalignedFileTable { length: 0x81 })
        );
    }

    #[test]
    fn truncated() {
        let key = key();
        let buffer = table(&key, 0x100, &[plain_record(b"A", 0, 0)]);

        assert_eq!(
            read_files(&buffer, &key, 0x100, 0x100),
            Err(ReadFilesError::TruncatedFileTable {
                offset: 0x100,
                length: 0x100,
                len: 0x180,
            })
        );

        assert!(read_files(&buffer, &key, u32::MAX, 0x80).is_err());
    }

    #[test]
    fn invalid_name_is_reported_lazily() {
        let key = key();
        let buffer = table(&key, 0, &[plain_record(b"\xB8", 0, 0)]);

        let songs = read_files(&buffer, &key, 0, 0x80).unwrap();
        assert_eq!(songs[0].name(), Err(FromBytesError::InvalidEncoding));
    }
}
