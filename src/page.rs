//! Pages, page descriptors, and the on-disk page header codec.
//!
//! A page is the caller-owned unit of archived data: an opaque payload plus
//! provenance (creation time, creating app, creating host) and an explicit
//! lifecycle state. The volume only reads from or fills a page within a
//! single call; it never retains a reference.
//!
//! On-disk page header layout, immediately preceding each payload:
//!
//! ```text
//! [magic: 2][addr check: 2][created: u64][host_len: u16][host]
//! [app_len: u16][app][payload_len: u32][payload]
//! ```

use crate::error::{Result, VolumeError};
use chrono::{DateTime, Utc};
use std::io::Read;

/// Page ids are byte offsets; non-exact addressing rounds up to this.
pub const ALIGNMENT: u64 = 16;

pub const PAGE_MAGIC: [u8; 2] = *b"PG";

/// A valid page never starts at offset 0; the volume header lives there.
pub const UNASSIGNED_PAGE_ID: u64 = 0;

/// Round a stream offset up to the next 16-byte boundary.
pub fn align_up(offset: u64) -> u64 {
    (offset + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Address-check bytes for a page header: bits 16-23 and 8-15 of the
/// page's own stream offset.
///
/// This is a weak locator check, not a checksum: two offsets congruent
/// modulo 65536 share the same bytes, so a pathologically corrupted stream
/// can pass it falsely. Preserved as-is for bit compatibility.
pub fn address_check_bytes(page_id: u64) -> [u8; 2] {
    [(page_id >> 16) as u8, (page_id >> 8) as u8]
}

/// Page lifecycle states.
///
/// Writer side: `New -> Written` (caller fills the payload, then seals).
/// Reader side: `New -> Filling -> Filled`, driven by the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    New,
    Written,
    Filling,
    Filled,
}

/// A caller-owned unit of archived payload bytes plus provenance.
#[derive(Debug, Clone)]
pub struct Page {
    payload: Vec<u8>,
    created_utc: DateTime<Utc>,
    creating_app: String,
    creating_host: String,
    state: PageState,
}

impl Page {
    pub fn new() -> Self {
        Page {
            payload: Vec::new(),
            created_utc: Utc::now(),
            creating_app: String::new(),
            creating_host: String::new(),
            state: PageState::New,
        }
    }

    /// Create a page carrying writer provenance, ready to fill and seal.
    pub fn with_provenance(app: impl Into<String>, host: impl Into<String>) -> Self {
        Page {
            creating_app: app.into(),
            creating_host: host.into(),
            ..Page::new()
        }
    }

    /// Replace the payload. Only legal before the page is sealed.
    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<()> {
        if self.state != PageState::New {
            return Err(VolumeError::InvalidState(format!(
                "set_payload requires a New page, found {:?}",
                self.state
            )));
        }
        self.payload = payload;
        Ok(())
    }

    /// Seal the page for appending: `New -> Written`, stamping the
    /// creation time. The payload is logically immutable afterwards.
    pub fn seal(&mut self) -> Result<()> {
        if self.state != PageState::New {
            return Err(VolumeError::InvalidState(format!(
                "seal requires a New page, found {:?}",
                self.state
            )));
        }
        self.created_utc = Utc::now();
        self.state = PageState::Written;
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn created_utc(&self) -> DateTime<Utc> {
        self.created_utc
    }

    pub fn creating_app(&self) -> &str {
        &self.creating_app
    }

    pub fn creating_host(&self) -> &str {
        &self.creating_host
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Begin a volume-driven fill. The page is reusable: any prior content
    /// is discarded.
    pub(crate) fn begin_fill(&mut self) {
        self.payload.clear();
        self.state = PageState::Filling;
    }

    /// Complete a volume-driven fill with the decoded payload and the
    /// provenance that was actually read from the stream.
    pub(crate) fn complete_fill(
        &mut self,
        payload: Vec<u8>,
        created_utc: DateTime<Utc>,
        app: String,
        host: String,
    ) {
        self.payload = payload;
        self.created_utc = created_utc;
        self.creating_app = app;
        self.creating_host = host;
        self.state = PageState::Filled;
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, payload-free descriptor of a page's identity, location, and
/// provenance. Used for lightweight iteration and cache entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Stream byte offset of the page header.
    pub page_id: u64,
    /// Aligned offset immediately following this page's payload.
    pub next_page_id: u64,
    pub created_utc: DateTime<Utc>,
    pub app: String,
    pub host: String,
}

/// Decoded page header fields, excluding the 4 check bytes.
#[derive(Debug, Clone)]
pub(crate) struct PageHeaderFields {
    pub created_unix: u64,
    pub host: String,
    pub app: String,
    pub payload_len: u32,
}

impl PageHeaderFields {
    pub fn created_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.created_unix as i64, 0)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Serialize the full page header (check bytes included) for the page
    /// at `page_id`.
    pub fn encode(&self, page_id: u64) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(18 + self.host.len() + self.app.len());
        bytes.extend_from_slice(&PAGE_MAGIC);
        bytes.extend_from_slice(&address_check_bytes(page_id));
        bytes.extend_from_slice(&self.created_unix.to_le_bytes());
        bytes.extend_from_slice(&(self.host.len() as u16).to_le_bytes());
        bytes.extend_from_slice(self.host.as_bytes());
        bytes.extend_from_slice(&(self.app.len() as u16).to_le_bytes());
        bytes.extend_from_slice(self.app.as_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    /// Read the header fields following already-validated check bytes.
    ///
    /// Returns `Ok(None)` if the stream ends mid-header: a page may have
    /// been only partially written, which is end-of-stream, not corruption.
    pub fn read_after_check<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let created_unix = match read_u64(reader)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let host = match read_string(reader)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let app = match read_string(reader)? {
            Some(v) => v,
            None => return Ok(None),
        };
        let payload_len = match read_u32(reader)? {
            Some(v) => v,
            None => return Ok(None),
        };

        Ok(Some(PageHeaderFields {
            created_unix,
            host,
            app,
            payload_len,
        }))
    }
}

fn read_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<Option<()>> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(Some(())),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(VolumeError::Io(e)),
    }
}

fn read_u64<R: Read>(reader: &mut R) -> Result<Option<u64>> {
    let mut buf = [0u8; 8];
    Ok(read_bytes(reader, &mut buf)?.map(|_| u64::from_le_bytes(buf)))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<Option<u32>> {
    let mut buf = [0u8; 4];
    Ok(read_bytes(reader, &mut buf)?.map(|_| u32::from_le_bytes(buf)))
}

fn read_string<R: Read>(reader: &mut R) -> Result<Option<String>> {
    let mut len_buf = [0u8; 2];
    if read_bytes(reader, &mut len_buf)?.is_none() {
        return Ok(None);
    }
    let mut bytes = vec![0u8; u16::from_le_bytes(len_buf) as usize];
    if read_bytes(reader, &mut bytes)?.is_none() {
        return Ok(None);
    }
    // Tolerate mangled provenance strings; the payload is what matters.
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 16);
        assert_eq!(align_up(16), 16);
        assert_eq!(align_up(17), 32);
        assert_eq!(align_up(4095), 4096);
    }

    #[test]
    fn test_address_check_bytes() {
        assert_eq!(address_check_bytes(0x00ABCDEF), [0xAB, 0xCD]);
        // Bits above 23 do not participate in the check.
        assert_eq!(address_check_bytes(0x12ABCD00), [0xAB, 0xCD]);
    }

    #[test]
    fn test_page_writer_lifecycle() {
        let mut page = Page::with_provenance("ingest", "host-a");
        assert_eq!(page.state(), PageState::New);

        page.set_payload(b"hello".to_vec()).unwrap();
        page.seal().unwrap();
        assert_eq!(page.state(), PageState::Written);
        assert_eq!(page.payload(), b"hello");

        // Sealed pages are immutable.
        assert!(matches!(
            page.set_payload(b"again".to_vec()),
            Err(VolumeError::InvalidState(_))
        ));
        assert!(matches!(page.seal(), Err(VolumeError::InvalidState(_))));
    }

    #[test]
    fn test_page_reader_lifecycle() {
        let mut page = Page::new();
        page.begin_fill();
        assert_eq!(page.state(), PageState::Filling);

        page.complete_fill(
            b"data".to_vec(),
            Utc::now(),
            "app".to_string(),
            "host".to_string(),
        );
        assert_eq!(page.state(), PageState::Filled);
        assert_eq!(page.payload(), b"data");
        assert_eq!(page.creating_app(), "app");

        // A filled page is reusable for the next fill.
        page.begin_fill();
        assert_eq!(page.state(), PageState::Filling);
        assert!(page.payload().is_empty());
    }

    #[test]
    fn test_page_header_round_trip() {
        let fields = PageHeaderFields {
            created_unix: 1_700_000_000,
            host: "builder-03".to_string(),
            app: "seal".to_string(),
            payload_len: 1234,
        };

        let page_id = 0x0004_5670;
        let bytes = fields.encode(page_id);
        assert_eq!(&bytes[0..2], &PAGE_MAGIC);
        assert_eq!(&bytes[2..4], &address_check_bytes(page_id));

        let mut cursor = Cursor::new(&bytes[4..]);
        let decoded = PageHeaderFields::read_after_check(&mut cursor)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.created_unix, 1_700_000_000);
        assert_eq!(decoded.host, "builder-03");
        assert_eq!(decoded.app, "seal");
        assert_eq!(decoded.payload_len, 1234);
    }

    #[test]
    fn test_truncated_page_header_is_eos() {
        let fields = PageHeaderFields {
            created_unix: 42,
            host: "h".to_string(),
            app: "a".to_string(),
            payload_len: 10,
        };
        let bytes = fields.encode(0x1000);

        // Cut the header short of the payload length field.
        let mut cursor = Cursor::new(&bytes[4..bytes.len() - 2]);
        assert!(PageHeaderFields::read_after_check(&mut cursor)
            .unwrap()
            .is_none());
    }
}
