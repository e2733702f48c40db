//! # PCSDE Tools
//!
//! The Piano Cat is a toy piano that plays back songs from a built-in song bank. The bank is
//! a single image holding folders of recordings, with the folder and song tables obfuscated.
//! This crate provides a command-line utility to look inside such an image, and to get the
//! recordings out as plain `.mid` files.
//!
//! ## Extract
//!
//! ```console
//! pcsde-tools-extract 0.1.0
//! Extract all songs from a song bank
//!
//! USAGE:
//!     pcsde-tools extract [OPTIONS] <PATH>
//!
//! ARGS:
//!     <PATH>    The path to the song bank to extract from
//!
//! OPTIONS:
//!     -f, --force              Overwrite existing files without asking
//!     -h, --help               Print help information
//!     -o, --output <OUTPUT>    The destination folder to place the songs
//!     -V, --version            Print version information
//! ```
//!
//! ### Example
//!
//! ```console
//! $ pcsde-tools extract songs.bin -o ./songs
//! 儿歌 -> 小星星
//! 儿歌 -> 两只老虎
//! Classics -> Minuet
//! Wrote 3/3 songs to ./songs
//! ```
//!
//! Every folder in the bank becomes a folder in the output directory. Entries whose names
//! can't be decoded get a placeholder (`DIR_000`, `SONG_000`), and entries that lie outside
//! the image are skipped. Both are reported at the end.
//!
//! ## Inspect
//!
//! ```console
//! pcsde-tools-inspect 0.1.0
//! Inspect song banks, or entire folders of them, for their contents
//!
//! USAGE:
//!     pcsde-tools inspect [OPTIONS] [PATHS]...
//!
//! ARGS:
//!     <PATHS>...    The path(s) to inspect
//!
//! OPTIONS:
//!     -e, --extension <EXTENSION>    The file extension song banks are recognized by [default: bin]
//!     -h, --help                     Print help information
//!     -r, --recursive                Search folders recursively
//!     -V, --version                  Print version information
//! ```
//!
//! Set `RUST_LOG=pcsde=debug` to see every decoded record.

pub mod extract;
pub mod inspect;
pub(crate) mod utils;
