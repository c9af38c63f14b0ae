//! Volume header: magic signature, info block, JSON metadata, pad region.
//!
//! The header occupies the start of the stream and is written exactly once
//! at creation. Every mount re-reads and validates it byte for byte; any
//! mismatch is `HeaderCorrupt`. Layout:
//!
//! ```text
//! [magic: 8][0x00 0x00][info_len: u32][info: UTF-8]
//! [meta_len: u32][metadata: JSON][pad: HEADER_PAD_LEN x PAD_BYTE]
//! ```
//!
//! The first page begins at the 16-byte-aligned offset after the pad.

use crate::error::{Result, VolumeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

pub const MAGIC: [u8; 8] = *b"AVOL\x00\x01\x00\x00";

/// Human-readable marker so a hexdump of the file identifies itself.
pub const INFO: &str = "archive volume: append-only page container";

pub const HEADER_PAD_LEN: usize = 256;
pub const PAD_BYTE: u8 = b'.';

/// Upper bound on the info/metadata length prefixes. A corrupt header must
/// not be able to provoke a multi-gigabyte allocation before validation.
const MAX_HEADER_FIELD: u32 = 1024 * 1024;

fn default_page_size() -> u64 {
    4 * 1024 * 1024
}

/// Immutable volume metadata, persisted once in the volume header.
///
/// Once the backing stream is non-empty this is fixed for the life of the
/// stream and read back unchanged on every mount. Unknown keys round-trip
/// verbatim through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeMetadata {
    /// Volume identity; used as the cache-key namespace.
    pub id: String,

    #[serde(default)]
    pub is_compressed: bool,

    /// Legal names are exactly "gzip" (fast) and "gzip-max" (best ratio).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_scheme: Option<String>,

    #[serde(default)]
    pub is_encrypted: bool,

    /// Resolved against the crypto registry at construction, never lazily.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_scheme: Option<String>,

    /// Soft sealing hint for external writer components; only affects
    /// future writes.
    #[serde(default = "default_page_size")]
    pub page_size_bytes: u64,

    /// Opaque key/value metadata, round-tripped verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl VolumeMetadata {
    pub fn new(id: impl Into<String>) -> Self {
        VolumeMetadata {
            id: id.into(),
            is_compressed: false,
            compression_scheme: None,
            is_encrypted: false,
            encryption_scheme: None,
            page_size_bytes: default_page_size(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_compression(mut self, scheme: impl Into<String>) -> Self {
        self.is_compressed = true;
        self.compression_scheme = Some(scheme.into());
        self
    }

    pub fn with_encryption(mut self, scheme: impl Into<String>) -> Self {
        self.is_encrypted = true;
        self.encryption_scheme = Some(scheme.into());
        self
    }
}

/// Serialize the volume header.
pub fn encode_header(metadata: &VolumeMetadata) -> Result<Vec<u8>> {
    let meta_json = serde_json::to_vec(metadata)?;

    let mut bytes =
        Vec::with_capacity(MAGIC.len() + 2 + 8 + INFO.len() + meta_json.len() + HEADER_PAD_LEN);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&[0u8, 0u8]);
    bytes.extend_from_slice(&(INFO.len() as u32).to_le_bytes());
    bytes.extend_from_slice(INFO.as_bytes());
    bytes.extend_from_slice(&(meta_json.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&meta_json);
    bytes.resize(bytes.len() + HEADER_PAD_LEN, PAD_BYTE);

    Ok(bytes)
}

/// Read and validate the volume header from the start of a stream.
///
/// Returns the metadata and the total header length in bytes. The reader
/// must be positioned at offset 0.
pub fn read_header<R: Read>(reader: &mut R) -> Result<(VolumeMetadata, u64)> {
    let mut magic = [0u8; 8];
    read_field(reader, &mut magic, "magic signature")?;
    if magic != MAGIC {
        return Err(VolumeError::HeaderCorrupt(format!(
            "bad magic signature {:02x?}",
            magic
        )));
    }

    let mut terminators = [0u8; 2];
    read_field(reader, &mut terminators, "terminators")?;
    if terminators != [0u8, 0u8] {
        return Err(VolumeError::HeaderCorrupt(format!(
            "bad terminator bytes {:02x?}",
            terminators
        )));
    }

    let info = read_length_prefixed(reader, "info block")?;
    if info.is_empty() {
        return Err(VolumeError::HeaderCorrupt("empty info block".to_string()));
    }
    std::str::from_utf8(&info)
        .map_err(|e| VolumeError::HeaderCorrupt(format!("info block not UTF-8: {}", e)))?;

    let meta_json = read_length_prefixed(reader, "metadata block")?;
    let metadata: VolumeMetadata = serde_json::from_slice(&meta_json)
        .map_err(|e| VolumeError::HeaderCorrupt(format!("metadata JSON invalid: {}", e)))?;

    let mut pad = [0u8; HEADER_PAD_LEN];
    read_field(reader, &mut pad, "pad region")?;
    if pad.iter().any(|&b| b != PAD_BYTE) {
        return Err(VolumeError::HeaderCorrupt(
            "pad region contains non-pad bytes".to_string(),
        ));
    }

    let total = (MAGIC.len() + 2 + 4 + info.len() + 4 + meta_json.len() + HEADER_PAD_LEN) as u64;
    Ok((metadata, total))
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            VolumeError::HeaderCorrupt(format!("truncated {}", what))
        } else {
            VolumeError::Io(e)
        }
    })
}

fn read_length_prefixed<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    read_field(reader, &mut len_bytes, what)?;
    let len = u32::from_le_bytes(len_bytes);
    if len > MAX_HEADER_FIELD {
        return Err(VolumeError::HeaderCorrupt(format!(
            "{} length {} exceeds limit {}",
            what, len, MAX_HEADER_FIELD
        )));
    }

    let mut bytes = vec![0u8; len as usize];
    read_field(reader, &mut bytes, what)?;
    Ok(bytes)
}
