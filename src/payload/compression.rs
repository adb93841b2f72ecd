//! Body compression for framed payloads.
//!
//! Uses DEFLATE to shrink the secret before encryption, so longer secrets fit
//! in the same cover. The framer records whether it was applied.

use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use std::io::Read;
use thiserror::Error;

/// Largest body `inflate` will produce.
pub const MAX_INFLATED_LEN: u64 = 64 * 1024 * 1024;

/// Compression errors.
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Decompressed body exceeds {0} bytes")]
    TooLarge(u64),
}

/// Compresses `data` with DEFLATE.
///
/// Returns `None` when compression would not make the data smaller.
pub fn deflate(data: &[u8]) -> Result<Option<Vec<u8>>, CompressionError> {
    if data.is_empty() {
        return Ok(None);
    }

    let mut encoder = DeflateEncoder::new(data, Compression::best());
    let mut compressed = Vec::new();

    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;

    if compressed.len() < data.len() {
        Ok(Some(compressed))
    } else {
        Ok(None)
    }
}

/// Decompresses output of [`deflate`], refusing to grow past
/// [`MAX_INFLATED_LEN`].
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut decoder = DeflateDecoder::new(data).take(MAX_INFLATED_LEN + 1);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() as u64 > MAX_INFLATED_LEN {
        return Err(CompressionError::TooLarge(MAX_INFLATED_LEN));
    }
    Ok(decompressed)
}
