use thiserror::Error;

#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Volume header corrupt: {0}")]
    HeaderCorrupt(String),

    #[error("No page header at exact offset {0}")]
    BadExactPageId(u64),

    #[error("Stream ended before the declared payload was fully read")]
    PrematureEof,

    #[error("Decryption failed integrity verification (tampered data or wrong key)")]
    IntegrityViolation,

    #[error("Decryption error: {0}")]
    DecipherError(String),

    #[error("Decompression error: {0}")]
    DecompressionError(String),

    #[error("Decoded payload of {len} bytes exceeds maximum buffer size {max}")]
    BufferTooLarge { len: usize, max: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata serialization error: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VolumeError>;
