//! Song payloads

use thiserror::Error;

/// Slice the raw bytes of a song out of the bank
///
/// Song payloads aren't obfuscated, so these are returned verbatim.
pub fn slice_payload(
    buffer: &[u8],
    offset: u32,
    length: u32,
) -> Result<&[u8], SlicePayloadError> {
    let start = offset as usize;
    start
        .checked_add(length as usize)
        .and_then(|end| buffer.get(start..end))
        .ok_or(SlicePayloadError::TruncatedPayload {
            offset,
            length,
            len: buffer.len(),
        })
}

/// Errors that might be returned from [`slice_payload()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlicePayloadError {
    /// The payload runs past the end of the buffer
    #[error("The payload at {offset:#X} ({length} bytes) runs past the end of the buffer ({len} bytes)")]
    TruncatedPayload { offset: u32, length: u32, len: usize },
}
