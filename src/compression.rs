//! Gzip compression for page payloads.
//!
//! Two presets trade CPU for ratio: "gzip" (fast) and "gzip-max" (best).
//! Exactly these two scheme names are legal in volume metadata; anything
//! else is a configuration error at construction time. Gzip streams are
//! self-framing, so decompression never needs the original length, but it
//! is bounded by a caller-supplied maximum to guard against decompression
//! bombs.

use crate::error::{Result, VolumeError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compression preset for page payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    /// Fast compression, moderate ratio.
    Gzip,
    /// Maximum ratio, more CPU.
    GzipMax,
}

impl CompressionScheme {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "gzip" => Ok(CompressionScheme::Gzip),
            "gzip-max" => Ok(CompressionScheme::GzipMax),
            other => Err(VolumeError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionScheme::Gzip => "gzip",
            CompressionScheme::GzipMax => "gzip-max",
        }
    }

    fn level(&self) -> Compression {
        match self {
            CompressionScheme::Gzip => Compression::fast(),
            CompressionScheme::GzipMax => Compression::best(),
        }
    }
}

/// Compress a payload with the given preset.
pub fn compress(data: &[u8], scheme: CompressionScheme) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 64), scheme.level());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress a gzip payload, refusing to inflate past `max_len` bytes.
///
/// Both presets produce standard gzip streams, so decompression does not
/// need to know which one was used.
pub fn decompress(data: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        let n = decoder
            .read(&mut chunk)
            .map_err(|e| VolumeError::DecompressionError(format!("gzip decode failed: {}", e)))?;
        if n == 0 {
            return Ok(out);
        }
        if out.len() + n > max_len {
            return Err(VolumeError::BufferTooLarge {
                len: out.len() + n,
                max: max_len,
            });
        }
        out.extend_from_slice(&chunk[..n]);
    }
}
