//! A NUL-terminated/length-restricted string in the device's legacy encoding
use encoding_rs::GBK;
use std::fmt;
use thiserror::Error;

/// A NUL-terminated/length-restricted string in GBK encoding
///
/// Directory and song records store their names in fixed-width fields, padded with NUL
/// bytes (120 bytes for directories, 64 for songs). The device writes these in GBK, the
/// legacy simplified Chinese multi-byte encoding.
///
/// Decoding stops at the first NUL byte. GBK never uses `0x00` as a trail byte, so this
/// can't split a character in half.
///
/// The capacity isn't the same for every record kind, which is why this struct is generic over it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name<const N: usize> {
    string: String,
}

impl<const N: usize> Name<N> {
    /// Try to decode a (padded) name field
    ///
    /// This function fails if the bytes are longer than the allowed capacity, or aren't
    /// valid GBK.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FromBytesError> {
        if bytes.len() > N {
            return Err(FromBytesError::TooLong { len: bytes.len() });
        }

        let len = bytes.iter().position(|byte| *byte == 0).unwrap_or(bytes.len());
        let string = GBK
            .decode_without_bom_handling_and_without_replacement(&bytes[..len])
            .ok_or(FromBytesError::InvalidEncoding)?
            .into_owned();

        Ok(Self { string })
    }

    /// The number of characters in the name
    pub fn len(&self) -> usize {
        self.string.chars().count()
    }

    /// Are there _any_ characters in the name?
    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }

    /// Convert to a [`prim@str`] slice
    pub fn as_str(&self) -> &str {
        &self.string
    }
}

impl<const N: usize> fmt::Display for Name<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can result from trying to decode a [`Name`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FromBytesError {
    /// The source slice is bigger than the name field
    #[error("The name is {len} bytes, which doesn't fit in the name field")]
    TooLong { len: usize },

    /// The bytes up to the NUL terminator aren't valid GBK
    #[error("The name is not valid GBK text")]
    InvalidEncoding,
}
