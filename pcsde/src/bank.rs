//! Song bank images and extracting their contents
//!
//! A song bank is a single image holding a tree of folders and the songs inside them. The
//! folder and song tables are obfuscated with a key that's derived from the image itself,
//! while the songs themselves are stored as-is.

use crate::{
    directory::{read_directories, read_directory_count, Directory, ReadDirectoriesError},
    key::{DeriveKeyError, Key},
    name::FromBytesError,
    payload::{slice_payload, SlicePayloadError},
    record::Record,
    song::{read_files, ReadFilesError, SongEntry},
};
use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};
use thiserror::Error;
use tracing::{debug, warn};

/// A song bank image, loaded entirely into memory
///
/// The key is derived as soon as the bank is loaded, so every [`SongBank`] is at least
/// long enough to hold its header.
///
/// ```no_run
/// # use pcsde::bank::SongBank;
/// # use std::fs::File;
/// // Load a bank from a path on disk
/// let bank = SongBank::from_path("songs.bin")?;
///
/// // Load a bank from an arbitrary reader
/// let bank = SongBank::from_reader(File::open("songs.bin")?)?;
///
/// let extraction = bank.extract()?;
/// for directory in &extraction.directories {
///     for song in &directory.songs {
///         println!("{}/{}", directory.name, song.file_name());
///     }
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct SongBank {
    bytes: Vec<u8>,
    key: Key,
}

impl SongBank {
    /// Wrap an in-memory image, deriving its key
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DeriveKeyError> {
        let key = Key::derive(&bytes)?;
        debug!(len = bytes.len(), %key, "derived song bank key");

        Ok(Self { bytes, key })
    }

    /// Deserialize a bank from an arbitrary I/O reader
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        Ok(Self::from_bytes(bytes)?)
    }

    /// Deserialize a bank from a path on disk
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Ok(Self::from_reader(file)?)
    }

    /// Access the raw image
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The de-obfuscation key derived from the image
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The number of directories the header declares
    pub fn directory_count(&self) -> Result<u32, ReadDirectoriesError> {
        read_directory_count(&self.bytes)
    }

    /// Decode the directory table
    pub fn directories(&self) -> Result<Vec<Directory>, ReadDirectoriesError> {
        read_directories(&self.bytes, &self.key)
    }

    /// Decode the song table of a single directory
    ///
    /// A record count too large to express as a table length is reported as a truncated table.
    pub fn songs(&self, directory: &Directory) -> Result<Vec<SongEntry>, ReadFilesError> {
        let length = directory
            .payload_length()
            .ok_or(ReadFilesError::TruncatedFileTable {
                offset: directory.payload_offset,
                length: u64::from(directory.record_count) * Record::LEN as u64,
                len: self.bytes.len(),
            })?;

        read_files(&self.bytes, &self.key, directory.payload_offset, length)
    }

    /// Slice out the payload of a single song
    pub fn payload(&self, song: &SongEntry) -> Result<&[u8], SlicePayloadError> {
        slice_payload(&self.bytes, song.song_offset, song.song_length)
    }

    /// Decode every directory and song in the bank
    ///
    /// Only a broken directory table fails the extraction as a whole, in which case nothing
    /// is returned. Anything that goes wrong with a single directory or song is recorded as a
    /// [`Warning`] instead, and the rest of the bank is still extracted:
    ///
    /// - A name that can't be decoded is replaced by a placeholder (see [`placeholder_name()`])
    /// - A directory whose song table is broken ends up without songs
    /// - A song whose payload lies outside the image is skipped
    pub fn extract(&self) -> Result<Extraction<'_>, ExtractError> {
        let mut warnings = Vec::new();
        let directories = self
            .directories()?
            .iter()
            .enumerate()
            .map(|(index, directory)| self.extract_directory(index, directory, &mut warnings))
            .collect();

        Ok(Extraction {
            directories,
            warnings,
        })
    }

    fn extract_directory(
        &self,
        index: usize,
        directory: &Directory,
        warnings: &mut Vec<Warning>,
    ) -> ExtractedDirectory<'_> {
        let name = match directory.name() {
            Ok(name) => name.as_str().to_owned(),
            Err(error) => {
                push_warning(warnings, Warning::InvalidDirectoryName { directory: index, error });
                placeholder_name(PlaceholderKind::Directory, index)
            }
        };

        let entries = match self.songs(directory) {
            Ok(entries) => entries,
            Err(error) => {
                push_warning(warnings, Warning::FileTable { directory: index, error });
                Vec::new()
            }
        };

        let mut songs = Vec::with_capacity(entries.len());
        for (song_index, entry) in entries.iter().enumerate() {
            let song_name = match entry.name() {
                Ok(name) => name.as_str().to_owned(),
                Err(error) => {
                    push_warning(
                        warnings,
                        Warning::InvalidSongName {
                            directory: index,
                            song: song_index,
                            error,
                        },
                    );
                    placeholder_name(PlaceholderKind::Song, song_index)
                }
            };

            match self.payload(entry) {
                Ok(bytes) => songs.push(ExtractedSong {
                    name: song_name,
                    bytes,
                }),
                Err(error) => push_warning(
                    warnings,
                    Warning::Payload {
                        directory: index,
                        song: song_index,
                        error,
                    },
                ),
            }
        }

        ExtractedDirectory { name, songs }
    }
}

fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    warn!("{warning}");
    warnings.push(warning);
}

/// What a placeholder name stands in for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Directory,
    Song,
}

/// The name used for a directory or song whose own name couldn't be decoded
///
/// Placeholders are built from the entry's position in its table (`DIR_003`, `SONG_012`),
/// so they're unique among their siblings.
pub fn placeholder_name(kind: PlaceholderKind, index: usize) -> String {
    match kind {
        PlaceholderKind::Directory => format!("DIR_{index:03}"),
        PlaceholderKind::Song => format!("SONG_{index:03}"),
    }
}

/// Everything decoded from a [`SongBank`]
///
/// Song bytes are borrowed from the bank, nothing is copied until it's written out.
#[derive(Debug)]
pub struct Extraction<'a> {
    /// The directories, in on-disk order
    pub directories: Vec<ExtractedDirectory<'a>>,

    /// Everything that was skipped or renamed along the way
    pub warnings: Vec<Warning>,
}

impl Extraction<'_> {
    /// The total number of songs over all directories
    pub fn song_count(&self) -> usize {
        self.directories.iter().map(ExtractedDirectory::len).sum()
    }
}

/// A decoded directory and the songs that could be extracted from it
#[derive(Debug)]
pub struct ExtractedDirectory<'a> {
    /// The decoded name, or a placeholder
    pub name: String,

    /// The songs, in on-disk order
    pub songs: Vec<ExtractedSong<'a>>,
}

impl ExtractedDirectory<'_> {
    /// The number of extracted songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Were no songs extracted at all?
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// A decoded song and its payload
#[derive(Debug)]
pub struct ExtractedSong<'a> {
    /// The decoded name, or a placeholder
    pub name: String,

    /// The raw payload
    pub bytes: &'a [u8],
}

impl ExtractedSong<'_> {
    /// The file name the song should be written to
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, SongEntry::EXTENSION)
    }
}

/// A recoverable failure during [`SongBank::extract()`]
///
/// Indices refer to the position of the entry in its table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Warning {
    /// A directory name couldn't be decoded, and was replaced by a placeholder
    #[error("Directory {directory} has an invalid name, using a placeholder")]
    InvalidDirectoryName {
        directory: usize,
        #[source]
        error: FromBytesError,
    },

    /// A song name couldn't be decoded, and was replaced by a placeholder
    #[error("Song {song} in directory {directory} has an invalid name, using a placeholder")]
    InvalidSongName {
        directory: usize,
        song: usize,
        #[source]
        error: FromBytesError,
    },

    /// A directory's song table couldn't be read, so none of its songs were extracted
    #[error("Could not read the song table of directory {directory}: {error}")]
    FileTable {
        directory: usize,
        #[source]
        error: ReadFilesError,
    },

    /// A song's payload lies outside the image, so it was skipped
    #[error("Skipped song {song} in directory {directory}: {error}")]
    Payload {
        directory: usize,
        song: usize,
        #[source]
        error: SlicePayloadError,
    },
}

/// Errors that might be returned from [`SongBank::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Any failure that has to do with I/O
    #[error("Something failed with I/O")]
    Read(#[from] io::Error),

    /// The image is too short to derive a key from
    #[error("Deriving the key failed")]
    Key(#[from] DeriveKeyError),
}

/// Errors that might be returned from [`SongBank::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Could not open the file for reading
    #[error("Could not open the file for reading")]
    FileOpen(#[from] io::Error),

    /// Deserialization from the file failed
    #[error("Reading the song bank from file failed")]
    Read(#[from] FromReaderError),
}

/// Errors that might be returned from [`SongBank::extract()`]
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The directory table is broken, so nothing could be extracted
    #[error("Reading the directory table failed")]
    Directories(#[from] ReadDirectoriesError),
}
