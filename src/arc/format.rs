#![forbid(unsafe_code)]

use std::borrow::Cow;
use std::io::{Read, Write};

use crate::arc::error::{ArcError, ArcResult};
use crate::arc::io::{read_exact, read_u32, write_u32};

/// ARC20 header magic. No NUL terminator on disk.
pub const MAGIC: [u8; 12] = *b"BURIKO ARC20";

/// Header: magic + u32 entry count.
pub const HEADER_LEN: usize = 12 + 4;

/// Capacity of the NUL-padded name field.
pub const NAME_CAPACITY: usize = 0x60;

/// Longest name that still leaves room for the terminating NUL.
pub const MAX_NAME_LEN: usize = NAME_CAPACITY - 1;

const RESERVED_LEN: usize = 0x18;

/// Index entry: name + u32 start + u32 size + reserved.
pub const ENTRY_LEN: usize = NAME_CAPACITY + 4 + 4 + RESERVED_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub count: u32,
}

impl ArchiveHeader {
    pub fn write_to(&self, w: &mut dyn Write) -> ArcResult<()> {
        w.write_all(&MAGIC)?;
        write_u32(w, self.count)
    }

    /// Reads and validates the magic. A short or unreadable stream is a
    /// format error: the input can't be trusted as an archive.
    pub fn read_from(r: &mut dyn Read) -> ArcResult<Self> {
        let magic = read_exact::<12>(r).map_err(|e| truncated(e, "header"))?;
        if magic != MAGIC {
            return Err(ArcError::Format("incorrect header (not BURIKO ARC20)".into()));
        }
        let count = read_u32(r).map_err(|e| truncated(e, "file count"))?;
        Ok(Self { count })
    }
}

/// One fixed-size index record. `start` is relative to the payload region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: Vec<u8>,
    pub start: u32,
    pub size: u32,
}

impl IndexEntry {
    /// Builds an entry, silently truncating `name` to [`MAX_NAME_LEN`] bytes.
    pub fn new(name: &[u8], start: u32, size: u32) -> Self {
        let len = name.len().min(MAX_NAME_LEN);
        Self {
            name: name[..len].to_vec(),
            start,
            size,
        }
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_LEN] {
        let mut buf = [0u8; ENTRY_LEN];
        let len = self.name.len().min(MAX_NAME_LEN);
        buf[..len].copy_from_slice(&self.name[..len]);
        buf[NAME_CAPACITY..NAME_CAPACITY + 4].copy_from_slice(&self.start.to_le_bytes());
        buf[NAME_CAPACITY + 4..NAME_CAPACITY + 8].copy_from_slice(&self.size.to_le_bytes());
        buf
    }

    /// Name ends at the first NUL (or fills the whole field); reserved bytes are ignored.
    pub fn from_bytes(buf: &[u8; ENTRY_LEN]) -> Self {
        let field = &buf[..NAME_CAPACITY];
        let end = field.iter().position(|&b| b == 0).unwrap_or(NAME_CAPACITY);
        let start = u32::from_le_bytes([
            buf[NAME_CAPACITY],
            buf[NAME_CAPACITY + 1],
            buf[NAME_CAPACITY + 2],
            buf[NAME_CAPACITY + 3],
        ]);
        let size = u32::from_le_bytes([
            buf[NAME_CAPACITY + 4],
            buf[NAME_CAPACITY + 5],
            buf[NAME_CAPACITY + 6],
            buf[NAME_CAPACITY + 7],
        ]);
        Self {
            name: field[..end].to_vec(),
            start,
            size,
        }
    }

    pub fn write_to(&self, w: &mut dyn Write) -> ArcResult<()> {
        w.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn read_from(r: &mut dyn Read) -> ArcResult<Self> {
        let buf = read_exact::<ENTRY_LEN>(r).map_err(|e| truncated(e, "index list"))?;
        Ok(Self::from_bytes(&buf))
    }
}

/// Public view of an archive entry (for listing and inspection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub start: u32,
    pub size: u32,
    /// Absolute position of the entry's first byte in the archive file.
    pub offset: u64,
}

/// Any failure to read the header or index means the archive can't be trusted.
fn truncated(err: ArcError, what: &str) -> ArcError {
    match err {
        ArcError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            ArcError::Format(format!("truncated {what}"))
        }
        ArcError::Io(e) => ArcError::Format(format!("failed to read {what}: {e}")),
        other => other,
    }
}
