//! The de-obfuscation key every table record is masked with

use std::{fmt, ops::Range};
use thiserror::Error;

/// The 32-byte mask used to (de-)obfuscate directory and song records
///
/// A song bank doesn't store the key itself. Instead it stores two blocks, `A` and `B`, at
/// fixed offsets in the header. Both are derived from the same key material, and their
/// byte-wise difference (modulo 256) is the working key:
///
/// ```text
/// key[i] = (B[i] - A[i]) mod 256
/// ```
///
/// The key is applied to records as a repeating mask, see [`Record`](crate::record::Record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    bytes: [u8; Self::LEN],
}

impl Key {
    /// The length of the key in bytes
    pub const LEN: usize = 32;

    /// Where key-derivation block `A` lives in the bank
    pub const A_RANGE: Range<usize> = 0x400..0x420;

    /// Where key-derivation block `B` lives in the bank
    pub const B_RANGE: Range<usize> = 0x420..0x440;

    /// Construct a key directly from its bytes
    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self { bytes }
    }

    /// Derive the key from the header of a song bank
    ///
    /// Only the two key-derivation blocks are read, so the buffer needs to be at least
    /// `B_RANGE.end` bytes long.
    pub fn derive(buffer: &[u8]) -> Result<Self, DeriveKeyError> {
        if buffer.len() < Self::B_RANGE.end {
            return Err(DeriveKeyError::TruncatedHeader { len: buffer.len() });
        }

        let a = &buffer[Self::A_RANGE];
        let b = &buffer[Self::B_RANGE];

        let mut bytes = [0; Self::LEN];
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = b[index].wrapping_sub(a[index]);
        }

        Ok(Self { bytes })
    }

    /// Access the underlying key bytes
    pub fn bytes(&self) -> &[u8; Self::LEN] {
        &self.bytes
    }

    /// The mask byte that applies to position `index` of a record
    ///
    /// The key repeats every [`Key::LEN`] bytes.
    #[inline]
    pub fn mask(&self, index: usize) -> u8 {
        self.bytes[index % Self::LEN]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.bytes {
            write!(f, "{byte:02X}")?;
        }

        Ok(())
    }
}

/// Errors that might be returned from [`Key::derive()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeriveKeyError {
    /// The buffer ends before both key-derivation blocks could be read
    #[error("The header is truncated ({len} bytes), the key material could not be read")]
    TruncatedHeader { len: usize },
}
