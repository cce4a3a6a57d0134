#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::arc::error::{ArcError, ArcResult};
use crate::arc::format::{ArchiveHeader, IndexEntry};
use crate::arc::path::SourceFile;
use crate::arc::progress::Progress;

/// In-memory ARC20 archive under construction.
///
/// Layout written by [`Archive::write_to`]:
/// - [MAGIC 12]
/// - [u32 entry_count]
/// - entries (128 bytes each, in insertion order)
///   - [name 96, NUL padded]
///   - [u32 start, relative to payload]
///   - [u32 size]
///   - [reserved 24]
/// - payload: file bytes concatenated in insertion order
///
/// Entries are never sorted; `start` of each entry is the sum of all
/// previous sizes.
#[derive(Debug, Default)]
pub struct Archive {
    entries: Vec<IndexEntry>,
    payload: Vec<u8>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file. `name` is truncated to fit the index field.
    pub fn push(&mut self, name: &[u8], data: &[u8]) -> ArcResult<&IndexEntry> {
        let size = u32::try_from(data.len()).map_err(|_| ArcError::FileTooLarge {
            path: PathBuf::from(String::from_utf8_lossy(name).into_owned()),
            size: data.len() as u64,
        })?;
        let start = u32::try_from(self.payload.len()).map_err(|_| ArcError::ArchiveTooLarge {
            size: self.payload.len() as u64,
        })?;
        let end = self.payload.len() as u64 + u64::from(size);
        if end > u64::from(u32::MAX) {
            return Err(ArcError::ArchiveTooLarge { size: end });
        }

        let entry = IndexEntry::new(name, start, size);
        debug!(name = %entry.display_name(), start, size, "added entry");
        self.payload.extend_from_slice(data);
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn write_to(&self, w: &mut dyn Write) -> ArcResult<()> {
        let count = u32::try_from(self.entries.len()).map_err(|_| ArcError::ArchiveTooLarge {
            size: self.entries.len() as u64,
        })?;
        ArchiveHeader { count }.write_to(w)?;
        for e in &self.entries {
            e.write_to(w)?;
        }
        w.write_all(&self.payload)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> ArcResult<Vec<u8>> {
        let mut out = Vec::with_capacity(
            crate::arc::format::HEADER_LEN
                + crate::arc::format::ENTRY_LEN * self.entries.len()
                + self.payload.len(),
        );
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Size of a source file as stored in the index.
pub fn entry_size(path: &Path, len: u64) -> ArcResult<u32> {
    u32::try_from(len).map_err(|_| ArcError::FileTooLarge {
        path: path.to_path_buf(),
        size: len,
    })
}

/// Reads every source file into a new archive, in the given order.
pub fn collect(
    files: &[SourceFile],
    progress: &mut dyn FnMut(Progress<'_>),
) -> ArcResult<Archive> {
    let mut archive = Archive::new();
    let total = files.len();

    for (i, src) in files.iter().enumerate() {
        progress(Progress::Packing {
            index: i + 1,
            total,
            name: String::from_utf8_lossy(&src.name),
        });

        let open_err = |source| ArcError::FileOpen {
            path: src.path.clone(),
            source,
        };
        let mut f = File::open(&src.path).map_err(open_err)?;
        let len = f.metadata().map_err(open_err)?.len();
        let size = entry_size(&src.path, len)?;

        let mut data = Vec::with_capacity(size as usize);
        f.read_to_end(&mut data).map_err(|source| ArcError::Read {
            what: format!("data from file {}", src.path.display()),
            source,
        })?;
        entry_size(&src.path, data.len() as u64)?;

        if data.is_empty() {
            warn!(path = %src.path.display(), "packing empty file; strict unpack rejects zero-size entries");
        }
        archive.push(&src.name, &data)?;
    }

    Ok(archive)
}

/// Writes `archive` to `output`. A partially written file is removed on failure.
pub fn write_archive(archive: &Archive, output: &Path) -> ArcResult<()> {
    let write_err = |source| ArcError::OutputWrite {
        path: output.to_path_buf(),
        source,
    };

    let f = File::create(output).map_err(|source| ArcError::FileOpen {
        path: output.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(f);

    let res = archive
        .write_to(&mut out)
        .and_then(|()| out.flush().map_err(ArcError::from))
        .map_err(|e| match e {
            ArcError::Io(source) => write_err(source),
            other => other,
        });

    if res.is_err() {
        drop(out);
        if let Err(e) = std::fs::remove_file(output) {
            warn!(path = %output.display(), error = %e, "failed to remove partial archive");
        }
    }
    res
}
