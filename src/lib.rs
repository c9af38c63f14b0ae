//! Archive Volume Storage Engine
//!
//! An append-only, page-oriented binary container that stores opaque byte
//! payloads with provenance metadata, optionally compressed and/or
//! encrypted, safely readable and appendable by many concurrent callers.
//!
//! ## Features
//!
//! - **Append-only pages**: written exactly once, never updated or deleted
//! - **Codec pipeline**: compress-then-encrypt on write, decrypt-then-
//!   decompress on read (gzip presets, pluggable AEAD providers)
//! - **Corruption-tolerant scanning**: non-exact reads skip damaged bytes
//!   and count them as soft errors instead of failing
//! - **Optional page cache**: decoded payloads keyed by (volume, page id),
//!   consulted lock-free with a double-checked retry under the stream lock
//! - **Single stream lock**: write-path codec work runs outside it
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy for volume operations
//! - [`header`] - Volume header (magic, info block, JSON metadata, pad)
//! - [`page`] - Pages, descriptors, and the page header codec
//! - [`compression`] - Gzip presets ("gzip" fast, "gzip-max" best)
//! - [`encryption`] - Crypto provider seam and AES-256-GCM built-in
//! - [`cache`] - Page cache seam and in-memory LRU implementation
//! - [`volume`] - The orchestrator
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use archive_volume::{Page, Volume, VolumeMetadata, VolumeOptions};
//! use std::fs::OpenOptions;
//!
//! # fn main() -> archive_volume::Result<()> {
//! let stream = OpenOptions::new()
//!     .read(true)
//!     .write(true)
//!     .create_new(true)
//!     .open("journal.avol")?;
//!
//! let metadata = VolumeMetadata::new("journal-2026").with_compression("gzip");
//! let volume = Volume::create(stream, metadata, VolumeOptions::default())?;
//!
//! let mut page = Page::with_provenance("ingest", "host-a");
//! page.set_payload(b"record batch".to_vec())?;
//! page.seal()?;
//! let page_id = volume.append_page(&page)?;
//!
//! let mut out = Page::new();
//! volume.read_page(page_id, &mut out, true)?;
//! assert_eq!(out.payload(), b"record batch");
//! # Ok(())
//! # }
//! ```
//!
//! ## Stream Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Volume header (offset 0, written once)      │
//! │  - Magic "AVOL\x00\x01\x00\x00", 2 x 0x00   │
//! │  - Info string, JSON metadata, pad region   │
//! ├─────────────────────────────────────────────┤
//! │ Page @ 16-byte-aligned offset               │
//! │  - 2 magic + 2 address-check bytes          │
//! │  - Timestamp, host, app, payload length     │
//! │  - Payload (compressed and/or encrypted)    │
//! ├─────────────────────────────────────────────┤
//! │ Page ...                                    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod compression;
pub mod encryption;
pub mod error;
pub mod header;
pub mod page;
pub mod volume;

// Re-export commonly used types
pub use cache::{CacheStats, MemoryPageCache, PageCache};
pub use compression::CompressionScheme;
pub use encryption::{Aes256GcmProvider, CryptoProvider, CryptoRegistry, EncryptionKey};
pub use error::{Result, VolumeError};
pub use header::VolumeMetadata;
pub use page::{Page, PageInfo, PageState, ALIGNMENT, UNASSIGNED_PAGE_ID};
pub use volume::{PageInfos, Volume, VolumeOptions, DEFAULT_MAX_BUFFER_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Volume header magic signature
pub const MAGIC: &[u8; 8] = &header::MAGIC;
