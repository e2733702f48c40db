//! The directory table at the start of a song bank

use crate::{
    key::Key,
    name::{FromBytesError, Name},
    record::Record,
};
use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

/// Where the little-endian directory count is stored
pub const DIRECTORY_COUNT_RANGE: Range<usize> = 0xFC..0x100;

/// Where the first directory record is stored
pub const DIRECTORY_TABLE_OFFSET: usize = 0x500;

/// A folder of songs, decoded from one directory record
///
/// After de-obfuscation, a directory record is laid out as follows:
///
/// | Bytes        | Field                                            |
/// |--------------|--------------------------------------------------|
/// | `0x00..0x78` | NUL-padded GBK name                              |
/// | `0x78..0x7C` | Number of song records in the directory's table  |
/// | `0x7C..0x80` | Absolute offset of the directory's song table    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    name: [u8; Self::NAME_LEN],

    /// The number of song records in this directory's table
    pub record_count: u32,

    /// The absolute offset of this directory's song table
    pub payload_offset: u32,
}

impl Directory {
    /// The capacity of the name field
    pub const NAME_LEN: usize = 0x78;

    const RECORD_COUNT_OFFSET: usize = 0x78;
    const TABLE_OFFSET_OFFSET: usize = 0x7C;

    /// Interpret a (de-obfuscated) directory record
    pub fn from_record(record: &Record) -> Self {
        let mut name = [0; Self::NAME_LEN];
        name.copy_from_slice(&record.bytes()[..Self::NAME_LEN]);

        Self {
            name,
            record_count: record.u32_at(Self::RECORD_COUNT_OFFSET),
            payload_offset: record.u32_at(Self::TABLE_OFFSET_OFFSET),
        }
    }

    /// Decode the directory's name
    pub fn name(&self) -> Result<Name<{ Directory::NAME_LEN }>, FromBytesError> {
        Name::from_bytes(&self.name)
    }

    /// Access the raw (de-obfuscated) name field
    pub fn name_bytes(&self) -> &[u8; Self::NAME_LEN] {
        &self.name
    }

    /// The number of song records in the directory's table
    pub fn song_count(&self) -> usize {
        self.record_count as usize
    }

    /// The length in bytes of this directory's song table
    ///
    /// The record stores the number of song records, which is scaled up by the record
    /// length here. Returns [`None`] if that length doesn't fit in a `u32`, in which case
    /// the table can't possibly lie within the bank.
    pub fn payload_length(&self) -> Option<u32> {
        self.record_count.checked_mul(Record::LEN as u32)
    }
}

/// Read the number of directories declared in the bank header
pub fn read_directory_count(buffer: &[u8]) -> Result<u32, ReadDirectoriesError> {
    let bytes = buffer
        .get(DIRECTORY_COUNT_RANGE)
        .ok_or(ReadDirectoriesError::TruncatedCount { len: buffer.len() })?;

    Ok(LittleEndian::read_u32(bytes))
}

/// Decode the entire directory table, in on-disk order
///
/// This fails without returning any directories if even a single record lies (partly)
/// outside the buffer.
pub fn read_directories(
    buffer: &[u8],
    key: &Key,
) -> Result<Vec<Directory>, ReadDirectoriesError> {
    let count = read_directory_count(buffer)?;

    // Check the whole table up front, so a bogus count can't make us allocate
    let fits = Record::range(DIRECTORY_TABLE_OFFSET, count as usize)
        .is_some_and(|next| next.start <= buffer.len());
    if !fits {
        return Err(ReadDirectoriesError::TruncatedDirectoryTable {
            count,
            len: buffer.len(),
        });
    }

    let mut directories = Vec::with_capacity(count as usize);
    for index in 0..count as usize {
        let offset = DIRECTORY_TABLE_OFFSET + index * Record::LEN;
        let record = Record::read(buffer, offset).ok_or(
            ReadDirectoriesError::TruncatedDirectoryTable {
                count,
                len: buffer.len(),
            },
        )?;

        let directory = Directory::from_record(&record.deobfuscate(key));
        debug!(
            index,
            record_count = directory.record_count,
            payload_offset = directory.payload_offset,
            "decoded directory record"
        );

        directories.push(directory);
    }

    Ok(directories)
}

/// Errors that might be returned from [`read_directories()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadDirectoriesError {
    /// The buffer ends before the directory count
    #[error("The buffer ({len} bytes) ends before the directory count")]
    TruncatedCount { len: usize },

    /// The declared directory records run past the end of the buffer
    #[error("The directory table of {count} records runs past the end of the buffer ({len} bytes)")]
    TruncatedDirectoryTable { count: u32, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Key {
        let mut bytes = [0; Key::LEN];
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = 0x3Bu8.wrapping_mul(index as u8).wrapping_add(0x81);
        }
        Key::new(bytes)
    }

    fn plain_record(name: &[u8], record_count: u32, table_offset: u32) -> Record {
        let mut bytes = [0; Record::LEN];
        bytes[..name.len()].copy_from_slice(name);
        LittleEndian::write_u32(&mut bytes[0x78..0x7C], record_count);
        LittleEndian::write_u32(&mut bytes[0x7C..0x80], table_offset);
        Record::new(bytes)
    }

    fn bank(key: &Key, records: &[Record], declared: u32) -> Vec<u8> {
        let mut buffer = vec![0; DIRECTORY_TABLE_OFFSET + records.len() * Record::LEN];
        LittleEndian::write_u32(&mut buffer[DIRECTORY_COUNT_RANGE], declared);
        for (index, record) in records.iter().enumerate() {
            let offset = DIRECTORY_TABLE_OFFSET + index * Record::LEN;
            buffer[offset..offset + Record::LEN].copy_from_slice(record.obfuscate(key).bytes());
        }
        buffer
    }

    #[test]
    fn two_directories() {
        let key = key();
        let buffer = bank(
            &key,
            &[
                plain_record(b"Nursery", 3, 0x800),
                plain_record(b"Classics", 1, 0x980),
            ],
            2,
        );

        let directories = read_directories(&buffer, &key).unwrap();
        assert_eq!(directories.len(), 2);

        assert_eq!(directories[0].name().unwrap().as_str(), "Nursery");
        assert_eq!(directories[0].payload_length(), Some(3 << 7));
        assert_eq!(directories[0].payload_offset, 0x800);
        assert_eq!(directories[0].song_count(), 3);

        assert_eq!(directories[1].name().unwrap().as_str(), "Classics");
        assert_eq!(directories[1].payload_length(), Some(1 << 7));
        assert_eq!(directories[1].payload_offset, 0x980);
        assert_eq!(directories[1].song_count(), 1);
    }

    #[test]
    fn oversized_record_count() {
        let key = key();
        let buffer = bank(&key, &[plain_record(b"Huge", 0x0200_0001, 0x580)], 1);

        let directories = read_directories(&buffer, &key).unwrap();
        assert_eq!(directories[0].record_count, 0x0200_0001);
        assert_eq!(directories[0].payload_length(), None);

        let directory = Directory::from_record(&plain_record(b"Max", 0x01FF_FFFF, 0));
        assert_eq!(directory.payload_length(), Some(0xFFFF_FF80));
    }

    #[test]
    fn empty_table() {
        let key = key();
        let buffer = bank(&key, &[], 0);
        assert_eq!(read_directories(&buffer, &key), Ok(Vec::new()));
    }

    #[test]
    fn invalid_name_is_reported_lazily() {
        let key = key();
        let buffer = bank(&key, &[plain_record(b"\xFF\xFF", 0, 0)], 1);

        let directories = read_directories(&buffer, &key).unwrap();
        assert_eq!(directories[0].name(), Err(FromBytesError::InvalidEncoding));
        assert_eq!(&directories[0].name_bytes()[..2], b"\xFF\xFF");
    }

    #[test]
    fn truncated_table() {
        let key = key();
        let mut buffer = bank(
            &key,
            &[plain_record(b"A", 1, 0), plain_record(b"B", 1, 0)],
            5,
        );
        buffer.truncate(DIRECTORY_TABLE_OFFSET + Record::LEN + 0x7C);

        assert_eq!(
            read_directories(&buffer, &key),
            Err(ReadDirectoriesError::TruncatedDirectoryTable {
                count: 5,
                len: buffer.len(),
            })
        );
    }

    #[test]
    fn absurd_count() {
        let key = key();
        let buffer = bank(&key, &[], u32::MAX);
        assert!(matches!(
            read_directories(&buffer, &key),
            Err(ReadDirectoriesError::TruncatedDirectoryTable { count: u32::MAX, .. })
        ));
    }

    #[test]
    fn truncated_count() {
        assert_eq!(
            read_directory_count(&[0; 0xFE]),
            Err(ReadDirectoriesError::TruncatedCount { len: 0xFE })
        );
    }
}
