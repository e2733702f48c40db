//! Decoding of Piano Cat song bank images
//!
//! The Piano Cat toy stores its songs in a single "song bank" image: a tree of folders,
//! each holding a number of recordings. The folder and song tables are obfuscated with a
//! 32-byte key that's derived from the image itself, while the recordings are plain
//! Standard MIDI Files.
//!
//! Decoding is a pipeline of pure functions over the image bytes:
//!
//! 1. [`Key::derive()`](key::Key::derive) recovers the key from the header
//! 2. [`read_directories()`](directory::read_directories) decodes the folder table
//! 3. [`read_files()`](song::read_files) decodes the song table of a folder
//! 4. [`slice_payload()`](payload::slice_payload) slices out a recording
//!
//! [`SongBank`](bank::SongBank) ties these together. Writing the results to disk is left to the caller.

pub mod bank;
pub mod directory;
pub mod key;
pub mod name;
pub mod payload;
pub mod record;
pub mod song;
