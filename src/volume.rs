//! Volume orchestration: construction, append path, read path, scanning.
//!
//! A `Volume` owns one backing random-access byte stream plus immutable
//! metadata, and coordinates the codec pipeline, the page cache, and a
//! single stream-exclusive lock. The format is append-only: pages are
//! written exactly once and never updated or deleted.

use crate::cache::PageCache;
use crate::compression::{self, CompressionScheme};
use crate::encryption::{CryptoProvider, CryptoRegistry};
use crate::error::{Result, VolumeError};
use crate::header::{self, VolumeMetadata};
use crate::page::{
    address_check_bytes, align_up, Page, PageHeaderFields, PageInfo, PageState, PAGE_MAGIC,
};
use parking_lot::Mutex;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Default cap on a decoded payload.
pub const DEFAULT_MAX_BUFFER_LEN: usize = 16 * 1024 * 1024;

/// Length of the page header check prefix (2 magic + 2 address-check).
const CHECK_LEN: u64 = 4;

/// Collaborators and limits fixed at volume construction.
pub struct VolumeOptions {
    /// Resolves `encryption_scheme` names from volume metadata.
    pub crypto: CryptoRegistry,
    /// Optional page cache; without one every read takes the locked path.
    pub cache: Option<Arc<dyn PageCache>>,
    /// Cap on a decoded payload (`BufferTooLarge` beyond it).
    pub max_buffer_len: usize,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        VolumeOptions {
            crypto: CryptoRegistry::new(),
            cache: None,
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
        }
    }
}

impl VolumeOptions {
    pub fn new() -> Self {
        VolumeOptions::default()
    }

    pub fn with_crypto(mut self, crypto: CryptoRegistry) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn PageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_max_buffer_len(mut self, max_buffer_len: usize) -> Self {
        self.max_buffer_len = max_buffer_len;
        self
    }
}

/// An archive volume: one backing byte stream plus immutable metadata.
///
/// Safe for concurrent use: the stream sits behind a single exclusive
/// lock, and write-path codec work runs outside it.
pub struct Volume<S> {
    stream: Mutex<S>,
    metadata: VolumeMetadata,
    /// Aligned offset of the first page, just past the volume header.
    first_page_offset: u64,
    compression: Option<CompressionScheme>,
    crypto: Option<Arc<dyn CryptoProvider>>,
    cache: Option<Arc<dyn PageCache>>,
    max_buffer_len: usize,
    /// Bad scan candidates skipped since the last reset. Growth rate is
    /// the caller's signal to abandon a badly damaged volume.
    soft_errors: AtomicU64,
}

impl<S> std::fmt::Debug for Volume<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("metadata", &self.metadata)
            .field("first_page_offset", &self.first_page_offset)
            .field("compression", &self.compression)
            .field("max_buffer_len", &self.max_buffer_len)
            .field("soft_errors", &self.soft_errors)
            .finish_non_exhaustive()
    }
}

impl<S: Read + Write + Seek> Volume<S> {
    /// Create a fresh volume on an empty stream, writing the header.
    pub fn create(mut stream: S, metadata: VolumeMetadata, options: VolumeOptions) -> Result<Self> {
        let end = stream.seek(SeekFrom::End(0))?;
        if end != 0 {
            return Err(VolumeError::InvalidState(format!(
                "create requires an empty stream, found {} bytes",
                end
            )));
        }

        let compression = resolve_compression(&metadata)?;
        let crypto = resolve_crypto(&metadata, &options.crypto)?;

        let header_bytes = header::encode_header(&metadata)?;
        stream.seek(SeekFrom::Start(0))?;
        stream.write_all(&header_bytes)?;
        stream.flush()?;

        info!(volume = %metadata.id, "created archive volume");
        Ok(Volume {
            stream: Mutex::new(stream),
            first_page_offset: align_up(header_bytes.len() as u64),
            metadata,
            compression,
            crypto,
            cache: options.cache,
            max_buffer_len: options.max_buffer_len,
            soft_errors: AtomicU64::new(0),
        })
    }

    /// Mount an existing volume, validating the header and schemes before
    /// any page operation is possible.
    pub fn mount(mut stream: S, options: VolumeOptions) -> Result<Self> {
        let end = stream.seek(SeekFrom::End(0))?;
        if end == 0 {
            return Err(VolumeError::InvalidState(
                "mount requires a non-empty stream".to_string(),
            ));
        }

        stream.seek(SeekFrom::Start(0))?;
        let (metadata, header_len) = header::read_header(&mut stream)?;

        let compression = resolve_compression(&metadata)?;
        let crypto = resolve_crypto(&metadata, &options.crypto)?;

        info!(volume = %metadata.id, bytes = end, "mounted archive volume");
        Ok(Volume {
            stream: Mutex::new(stream),
            first_page_offset: align_up(header_len),
            metadata,
            compression,
            crypto,
            cache: options.cache,
            max_buffer_len: options.max_buffer_len,
            soft_errors: AtomicU64::new(0),
        })
    }

    pub fn metadata(&self) -> &VolumeMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Soft sealing hint for external writer components.
    pub fn page_size_bytes(&self) -> u64 {
        self.metadata.page_size_bytes
    }

    /// Aligned offset of the first page in the stream.
    pub fn first_page_offset(&self) -> u64 {
        self.first_page_offset
    }

    pub fn soft_errors(&self) -> u64 {
        self.soft_errors.load(Ordering::Relaxed)
    }

    pub fn reset_soft_errors(&self) {
        self.soft_errors.store(0, Ordering::Relaxed);
    }

    /// Flush buffered writes to the backing stream.
    pub fn flush(&self) -> Result<()> {
        self.stream.lock().flush()?;
        Ok(())
    }

    /// Append a sealed page, returning its assigned page id.
    pub fn append_page(&self, page: &Page) -> Result<u64> {
        if page.state() != PageState::Written {
            return Err(VolumeError::InvalidState(format!(
                "append_page requires a Written page, found {:?}",
                page.state()
            )));
        }
        if page.creating_host().len() > u16::MAX as usize
            || page.creating_app().len() > u16::MAX as usize
        {
            return Err(VolumeError::InvalidState(
                "page provenance strings exceed 65535 bytes".to_string(),
            ));
        }

        // Codec work stays outside the stream lock so CPU-bound encoding
        // never blocks other callers' stream access.
        let encoded = self.encode_payload(page.payload())?;
        if encoded.len() > u32::MAX as usize {
            return Err(VolumeError::BufferTooLarge {
                len: encoded.len(),
                max: u32::MAX as usize,
            });
        }

        let fields = PageHeaderFields {
            created_unix: page.created_utc().timestamp().max(0) as u64,
            host: page.creating_host().to_string(),
            app: page.creating_app().to_string(),
            payload_len: encoded.len() as u32,
        };

        let mut stream = self.stream.lock();
        let end = stream.seek(SeekFrom::End(0))?;
        let page_id = align_up(end);
        if page_id > end {
            stream.write_all(&vec![0u8; (page_id - end) as usize])?;
        }

        let header_bytes = fields.encode(page_id);
        stream.write_all(&header_bytes)?;
        stream.write_all(&encoded)?;
        stream.flush()?;

        let next_page_id = align_up(page_id + header_bytes.len() as u64 + encoded.len() as u64);

        if let Some(cache) = self.active_cache() {
            let page_info = PageInfo {
                page_id,
                next_page_id,
                created_utc: fields.created_utc(),
                app: fields.app.clone(),
                host: fields.host.clone(),
            };
            // The cache stores decoded content so later reads skip the
            // codec pipeline.
            cache.put(&self.metadata.id, page_id, page_info, Arc::from(page.payload()));
        }

        debug!(
            volume = %self.metadata.id,
            page_id,
            payload = page.payload().len(),
            encoded = encoded.len(),
            "appended page"
        );
        Ok(page_id)
    }

    /// Read a page into the caller-supplied `page`.
    ///
    /// With `exact_page_id` the offset must point exactly at a page header
    /// (`BadExactPageId` otherwise); without it the offset is aligned up
    /// and the volume scans forward past corruption. Returns the next
    /// page id, or `None` once the stream is exhausted.
    pub fn read_page(&self, page_id: u64, page: &mut Page, exact_page_id: bool) -> Result<Option<u64>> {
        let lookup_id = if exact_page_id { page_id } else { align_up(page_id) };

        // Lock-free first look.
        if let Some(next) = self.try_fill_from_cache(lookup_id, page) {
            return Ok(Some(next));
        }

        let mut stream = self.stream.lock();
        // Another thread may have populated the cache while we waited.
        if let Some(next) = self.try_fill_from_cache(lookup_id, page) {
            return Ok(Some(next));
        }

        let stream_len = stream.seek(SeekFrom::End(0))?;
        let found = match self.locate(&mut *stream, lookup_id, stream_len, exact_page_id)? {
            Some(id) => id,
            None => return Ok(None),
        };

        let fields = match PageHeaderFields::read_after_check(&mut *stream)? {
            Some(fields) => fields,
            None => return Ok(None),
        };

        let payload_start = stream.stream_position()?;
        let payload_len = fields.payload_len as u64;
        if payload_start + payload_len > stream_len {
            // Partially written page; a racing reader sees a shorter chain.
            return Ok(None);
        }

        let mut raw = vec![0u8; fields.payload_len as usize];
        read_payload(&mut *stream, &mut raw)?;

        let decoded = self.decode_payload(raw)?;
        let next_page_id = align_up(payload_start + payload_len);
        let created_utc = fields.created_utc();

        if let Some(cache) = self.active_cache() {
            let page_info = PageInfo {
                page_id: found,
                next_page_id,
                created_utc,
                app: fields.app.clone(),
                host: fields.host.clone(),
            };
            cache.put(&self.metadata.id, found, page_info, Arc::from(decoded.as_slice()));
        }

        debug!(volume = %self.metadata.id, page_id = found, bytes = decoded.len(), "read page");
        page.begin_fill();
        page.complete_fill(decoded, created_utc, fields.app, fields.host);
        Ok(Some(next_page_id))
    }

    /// Header-only analogue of `read_page`: no payload decode.
    pub fn read_page_info(&self, page_id: u64, exact_page_id: bool) -> Result<Option<PageInfo>> {
        let lookup_id = if exact_page_id { page_id } else { align_up(page_id) };

        if let Some((page_info, _)) = self.cache_lookup(lookup_id) {
            return Ok(Some(page_info));
        }

        let mut stream = self.stream.lock();
        if let Some((page_info, _)) = self.cache_lookup(lookup_id) {
            return Ok(Some(page_info));
        }

        let stream_len = stream.seek(SeekFrom::End(0))?;
        let found = match self.locate(&mut *stream, lookup_id, stream_len, exact_page_id)? {
            Some(id) => id,
            None => return Ok(None),
        };

        let fields = match PageHeaderFields::read_after_check(&mut *stream)? {
            Some(fields) => fields,
            None => return Ok(None),
        };

        let payload_start = stream.stream_position()?;
        let payload_len = fields.payload_len as u64;
        if payload_start + payload_len > stream_len {
            return Ok(None);
        }

        Ok(Some(PageInfo {
            page_id: found,
            next_page_id: align_up(payload_start + payload_len),
            created_utc: fields.created_utc(),
            app: fields.app,
            host: fields.host,
        }))
    }

    /// Lazy, finite, forward-only iteration over page descriptors,
    /// following next-page chaining until end of stream.
    pub fn read_page_infos(&self, start_page_id: u64) -> PageInfos<'_, S> {
        PageInfos {
            volume: self,
            next: start_page_id,
            done: false,
        }
    }

    fn active_cache(&self) -> Option<&Arc<dyn PageCache>> {
        self.cache.as_ref().filter(|cache| cache.enabled())
    }

    fn cache_lookup(&self, page_id: u64) -> Option<(PageInfo, Arc<[u8]>)> {
        let hit = self.active_cache()?.try_get(&self.metadata.id, page_id)?;
        trace!(volume = %self.metadata.id, page_id, "page cache hit");
        Some(hit)
    }

    fn try_fill_from_cache(&self, page_id: u64, page: &mut Page) -> Option<u64> {
        let (page_info, payload) = self.cache_lookup(page_id)?;
        page.begin_fill();
        page.complete_fill(
            payload.to_vec(),
            page_info.created_utc,
            page_info.app,
            page_info.host,
        );
        Some(page_info.next_page_id)
    }

    /// Position the stream just past a validated check prefix and return
    /// the page id it belongs to.
    fn locate(
        &self,
        stream: &mut S,
        page_id: u64,
        stream_len: u64,
        exact_page_id: bool,
    ) -> Result<Option<u64>> {
        if exact_page_id {
            self.locate_exact(stream, page_id, stream_len).map(Some)
        } else {
            self.scan_forward(stream, page_id, stream_len)
        }
    }

    fn locate_exact(&self, stream: &mut S, page_id: u64, stream_len: u64) -> Result<u64> {
        if page_id < self.first_page_offset || page_id + CHECK_LEN > stream_len {
            return Err(VolumeError::BadExactPageId(page_id));
        }

        stream.seek(SeekFrom::Start(page_id))?;
        let mut check = [0u8; CHECK_LEN as usize];
        stream.read_exact(&mut check)?;
        if check[0..2] != PAGE_MAGIC || check[2..4] != address_check_bytes(page_id) {
            return Err(VolumeError::BadExactPageId(page_id));
        }
        Ok(page_id)
    }

    /// Corruption-tolerant forward scan: advance one byte per failed
    /// candidate, counting each as a soft error, until the check prefix
    /// matches or the stream runs out.
    fn scan_forward(&self, stream: &mut S, start: u64, stream_len: u64) -> Result<Option<u64>> {
        // The header region is not corruption; clamp without counting.
        let mut candidate = start.max(self.first_page_offset);
        let mut skipped: u64 = 0;

        let found = loop {
            if candidate + CHECK_LEN > stream_len {
                break None;
            }
            stream.seek(SeekFrom::Start(candidate))?;
            let mut check = [0u8; CHECK_LEN as usize];
            stream.read_exact(&mut check)?;
            if check[0..2] == PAGE_MAGIC && check[2..4] == address_check_bytes(candidate) {
                break Some(candidate);
            }
            skipped += 1;
            candidate += 1;
        };

        if skipped > 0 {
            self.soft_errors.fetch_add(skipped, Ordering::Relaxed);
            warn!(
                volume = %self.metadata.id,
                start,
                skipped,
                "scan skipped bad candidate bytes"
            );
        }
        Ok(found)
    }

    /// Compress-then-encrypt. The ordering is fixed: encrypting first
    /// would defeat compression.
    fn encode_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut bytes = match self.compression {
            Some(scheme) => compression::compress(payload, scheme)?,
            None => payload.to_vec(),
        };
        if let Some(crypto) = &self.crypto {
            bytes = crypto.protect(&bytes)?;
        }
        Ok(bytes)
    }

    /// Decrypt-then-decompress, mirroring `encode_payload`.
    fn decode_payload(&self, raw: Vec<u8>) -> Result<Vec<u8>> {
        let bytes = match &self.crypto {
            Some(crypto) => crypto.unprotect(&raw)?,
            None => raw,
        };
        match self.compression {
            Some(_) => compression::decompress(&bytes, self.max_buffer_len),
            None => Ok(bytes),
        }
    }
}

fn resolve_compression(metadata: &VolumeMetadata) -> Result<Option<CompressionScheme>> {
    if !metadata.is_compressed {
        return Ok(None);
    }
    let name = metadata
        .compression_scheme
        .as_deref()
        .ok_or_else(|| VolumeError::UnsupportedScheme("<missing compression scheme>".to_string()))?;
    Ok(Some(CompressionScheme::from_name(name)?))
}

fn resolve_crypto(
    metadata: &VolumeMetadata,
    registry: &CryptoRegistry,
) -> Result<Option<Arc<dyn CryptoProvider>>> {
    if !metadata.is_encrypted {
        return Ok(None);
    }
    let name = metadata
        .encryption_scheme
        .as_deref()
        .ok_or_else(|| VolumeError::UnsupportedScheme("<missing encryption scheme>".to_string()))?;
    Ok(Some(registry.resolve(name)?))
}

/// Read a declared payload in full; a genuine EOF mid-read means the
/// stream shrank or lied, which is a hard error.
fn read_payload<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            VolumeError::PrematureEof
        } else {
            VolumeError::Io(e)
        }
    })
}

/// Forward-only page descriptor iterator. Non-restartable: once the end
/// sentinel or an error is seen, the iterator is exhausted.
pub struct PageInfos<'a, S> {
    volume: &'a Volume<S>,
    next: u64,
    done: bool,
}

impl<'a, S: Read + Write + Seek> Iterator for PageInfos<'a, S> {
    type Item = Result<PageInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.volume.read_page_info(self.next, false) {
            Ok(Some(page_info)) => {
                self.next = page_info.next_page_id;
                Some(Ok(page_info))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    type MemVolume = Volume<Cursor<Vec<u8>>>;

    fn new_volume(metadata: VolumeMetadata) -> MemVolume {
        Volume::create(Cursor::new(Vec::new()), metadata, VolumeOptions::default()).unwrap()
    }

    fn sealed_page(payload: &[u8]) -> Page {
        let mut page = Page::with_provenance("tester", "unit-host");
        page.set_payload(payload.to_vec()).unwrap();
        page.seal().unwrap();
        page
    }

    fn into_stream(volume: MemVolume) -> Cursor<Vec<u8>> {
        volume.stream.into_inner()
    }

    #[test]
    fn test_create_requires_empty_stream() {
        let stream = Cursor::new(vec![1u8, 2, 3]);
        let err = Volume::create(stream, VolumeMetadata::new("v"), VolumeOptions::default())
            .unwrap_err();
        assert!(matches!(err, VolumeError::InvalidState(_)));
    }

    #[test]
    fn test_mount_requires_nonempty_stream() {
        let err = MemVolume::mount(Cursor::new(Vec::new()), VolumeOptions::default()).unwrap_err();
        assert!(matches!(err, VolumeError::InvalidState(_)));
    }

    #[test]
    fn test_unsupported_compression_scheme_fails_at_create() {
        let metadata = VolumeMetadata::new("v").with_compression("snappy");
        let err = MemVolume::create(Cursor::new(Vec::new()), metadata, VolumeOptions::default())
            .unwrap_err();
        assert!(matches!(err, VolumeError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_unsupported_encryption_scheme_fails_at_create() {
        let metadata = VolumeMetadata::new("v").with_encryption("vigenere");
        let err = MemVolume::create(Cursor::new(Vec::new()), metadata, VolumeOptions::default())
            .unwrap_err();
        assert!(matches!(err, VolumeError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_metadata_survives_mount() {
        let mut metadata = VolumeMetadata::new("vol-7").with_compression("gzip-max");
        metadata
            .extra
            .insert("tenant".to_string(), serde_json::json!("acme"));

        let volume = new_volume(metadata);
        let stream = into_stream(volume);

        let mounted = MemVolume::mount(stream, VolumeOptions::default()).unwrap();
        assert_eq!(mounted.id(), "vol-7");
        assert!(mounted.metadata().is_compressed);
        assert_eq!(
            mounted.metadata().compression_scheme.as_deref(),
            Some("gzip-max")
        );
        assert_eq!(mounted.metadata().extra["tenant"], serde_json::json!("acme"));
    }

    #[test]
    fn test_append_requires_written_state() {
        let volume = new_volume(VolumeMetadata::new("v"));

        let unsealed = Page::with_provenance("a", "h");
        assert!(matches!(
            volume.append_page(&unsealed),
            Err(VolumeError::InvalidState(_))
        ));

        let mut filled = Page::new();
        filled.begin_fill();
        filled.complete_fill(vec![1], chrono::Utc::now(), "a".into(), "h".into());
        assert!(matches!(
            volume.append_page(&filled),
            Err(VolumeError::InvalidState(_))
        ));
    }

    #[test]
    fn test_append_read_round_trip_in_memory() {
        let volume = new_volume(VolumeMetadata::new("v"));
        let page_id = volume.append_page(&sealed_page(b"in-memory payload")).unwrap();
        assert!(page_id >= volume.first_page_offset());
        assert_eq!(page_id % 16, 0);

        let mut out = Page::new();
        let next = volume.read_page(page_id, &mut out, true).unwrap();
        assert!(next.is_some());
        assert_eq!(out.payload(), b"in-memory payload");
        assert_eq!(out.creating_app(), "tester");
        assert_eq!(out.creating_host(), "unit-host");
        assert_eq!(out.state(), PageState::Filled);
    }

    #[test]
    fn test_read_from_zero_scans_to_first_page() {
        let volume = new_volume(VolumeMetadata::new("v"));
        volume.append_page(&sealed_page(b"first")).unwrap();

        let mut out = Page::new();
        let next = volume.read_page(0, &mut out, false).unwrap();
        assert!(next.is_some());
        assert_eq!(out.payload(), b"first");
        // Skipping the header region is not corruption.
        assert_eq!(volume.soft_errors(), 0);
    }

    #[test]
    fn test_read_past_end_is_sentinel() {
        let volume = new_volume(VolumeMetadata::new("v"));
        let page_id = volume.append_page(&sealed_page(b"only")).unwrap();

        let mut out = Page::new();
        let next = volume.read_page(page_id, &mut out, true).unwrap().unwrap();
        assert_eq!(volume.read_page(next, &mut out, false).unwrap(), None);
    }

    #[test]
    fn test_exact_read_of_misaligned_offset_fails() {
        let volume = new_volume(VolumeMetadata::new("v"));
        let page_id = volume.append_page(&sealed_page(b"payload bytes here")).unwrap();

        let mut out = Page::new();
        let err = volume.read_page(page_id + 7, &mut out, true).unwrap_err();
        assert!(matches!(err, VolumeError::BadExactPageId(_)));

        // Offsets inside the volume header are never valid pages.
        let err = volume.read_page(3, &mut out, true).unwrap_err();
        assert!(matches!(err, VolumeError::BadExactPageId(_)));
    }

    #[test]
    fn test_next_page_chaining() {
        let volume = new_volume(VolumeMetadata::new("v"));
        let id0 = volume.append_page(&sealed_page(b"page zero")).unwrap();
        let id1 = volume.append_page(&sealed_page(b"page one")).unwrap();

        let mut out = Page::new();
        let next = volume.read_page(id0, &mut out, true).unwrap().unwrap();
        assert_eq!(next, id1);
    }

    #[test]
    fn test_page_infos_iteration() {
        let volume = new_volume(VolumeMetadata::new("v"));
        let ids: Vec<u64> = (0..3)
            .map(|i| {
                volume
                    .append_page(&sealed_page(format!("payload {}", i).as_bytes()))
                    .unwrap()
            })
            .collect();

        let infos: Vec<PageInfo> = volume
            .read_page_infos(0)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos.iter().map(|i| i.page_id).collect::<Vec<_>>(), ids);
        assert!(infos.iter().all(|i| i.app == "tester"));
    }

    #[test]
    fn test_soft_error_counter_reset() {
        let volume = new_volume(VolumeMetadata::new("v"));
        volume.soft_errors.fetch_add(5, Ordering::Relaxed);
        assert_eq!(volume.soft_errors(), 5);
        volume.reset_soft_errors();
        assert_eq!(volume.soft_errors(), 0);
    }

    #[test]
    fn test_page_size_hint_exposed() {
        let mut metadata = VolumeMetadata::new("v");
        metadata.page_size_bytes = 123_456;
        let volume = new_volume(metadata);
        assert_eq!(volume.page_size_bytes(), 123_456);
    }
}
