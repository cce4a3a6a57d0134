#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::arc::error::{ArcError, ArcResult};
use crate::arc::format::{ArchiveHeader, EntryInfo, IndexEntry};
use crate::arc::io::read_up_to;
use crate::arc::path::{output_path, validate_name};
use crate::arc::progress::Progress;

/// Upper bound on entries preallocated before they are actually read.
const INDEX_PREALLOC: usize = 4096;

/// Extraction policy knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnpackOptions {
    /// Extract zero-size entries as empty files instead of rejecting the archive.
    pub allow_empty: bool,
}

/// A validated header and index over a seekable archive stream.
#[derive(Debug)]
pub struct ArchiveReader<R> {
    inner: R,
    entries: Vec<IndexEntry>,
    data_start: u64,
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Reads the header and the whole index. Nothing past the index is touched.
    pub fn open(mut inner: R) -> ArcResult<Self> {
        let header = ArchiveHeader::read_from(&mut inner)?;
        let entries = read_index(&mut inner, header.count)?;
        let data_start = inner.stream_position().map_err(ArcError::DataPosition)?;
        debug!(count = header.count, data_start, "read archive index");

        Ok(Self {
            inner,
            entries,
            data_start,
        })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Absolute position of an entry's data in the archive stream.
    pub fn offset_of(&self, entry: &IndexEntry) -> u64 {
        self.data_start + u64::from(entry.start)
    }

    pub fn infos(&self) -> Vec<EntryInfo> {
        self.entries
            .iter()
            .map(|e| EntryInfo {
                name: e.display_name().into_owned(),
                start: e.start,
                size: e.size,
                offset: self.offset_of(e),
            })
            .collect()
    }

    /// Reads exactly `size` bytes of entry `index` from `data_start + start`.
    /// Entries need not be contiguous or in payload order.
    pub fn read_entry(&mut self, index: usize) -> ArcResult<Vec<u8>> {
        let Self {
            inner,
            entries,
            data_start,
        } = self;
        let entry = entries
            .get(index)
            .ok_or_else(|| ArcError::Format(format!("no entry at index {index}")))?;
        let name = entry.display_name();
        let pos = *data_start + u64::from(entry.start);

        inner
            .seek(SeekFrom::Start(pos))
            .map_err(|source| ArcError::Seek {
                name: name.to_string(),
                source,
            })?;

        let data = read_up_to(inner, entry.size).map_err(|e| match e {
            ArcError::Io(source) => ArcError::Read {
                what: format!("data for file {name}"),
                source,
            },
            other => other,
        })?;

        if data.len() as u64 != u64::from(entry.size) {
            return Err(ArcError::IncompleteData {
                name: name.into_owned(),
                read: data.len() as u64,
                expected: entry.size,
            });
        }
        Ok(data)
    }
}

/// Reads `count` index entries one at a time, so a corrupt count fails on
/// truncation instead of forcing a huge allocation.
pub fn read_index(r: &mut dyn Read, count: u32) -> ArcResult<Vec<IndexEntry>> {
    let mut out = Vec::with_capacity((count as usize).min(INDEX_PREALLOC));
    for _ in 0..count {
        out.push(IndexEntry::read_from(r)?);
    }
    Ok(out)
}

/// Rejects entries that cannot be extracted: empty or unsafe names always,
/// zero sizes unless `opts.allow_empty`.
pub fn validate_entry(entry: &IndexEntry, opts: &UnpackOptions) -> ArcResult<()> {
    validate_name(&entry.name)?;
    if entry.size == 0 && !opts.allow_empty {
        return Err(ArcError::Format(format!(
            "zero-size file found in index: {}",
            entry.display_name()
        )));
    }
    Ok(())
}

/// Extracts every entry into `dest`, in index order.
///
/// The whole index is validated before the first file is written, so a
/// malformed entry anywhere aborts without touching `dest`.
pub fn extract_all<R: Read + Seek>(
    reader: &mut ArchiveReader<R>,
    dest: &Path,
    opts: &UnpackOptions,
    progress: &mut dyn FnMut(Progress<'_>),
) -> ArcResult<usize> {
    for e in reader.entries() {
        validate_entry(e, opts)?;
    }

    let total = reader.entries().len();
    for i in 0..total {
        let entry = reader.entries()[i].clone();
        progress(Progress::Extracting {
            index: i + 1,
            total,
            name: entry.display_name(),
        });

        let out_path = output_path(dest, &entry.name)?;
        let data = reader.read_entry(i)?;
        write_file(&out_path, &data)?;
    }
    Ok(total)
}

/// Writes one extracted file. A partially written file is removed on failure.
fn write_file(path: &Path, data: &[u8]) -> ArcResult<()> {
    let mut f = File::create(path).map_err(|source| ArcError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(source) = f.write_all(data).and_then(|()| f.flush()) {
        drop(f);
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove partial file");
        }
        return Err(ArcError::OutputWrite {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
