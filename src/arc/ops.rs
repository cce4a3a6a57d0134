#![forbid(unsafe_code)]

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{info, warn};

use crate::arc::build::{collect, write_archive};
use crate::arc::error::{ArcError, ArcResult};
use crate::arc::format::EntryInfo;
use crate::arc::path::scan_dir;
use crate::arc::progress::{silent, Progress};
use crate::arc::read::{extract_all, validate_entry, ArchiveReader, UnpackOptions};

fn open_archive(archive: &Path) -> ArcResult<ArchiveReader<BufReader<File>>> {
    let f = File::open(archive).map_err(|source| ArcError::FileOpen {
        path: archive.to_path_buf(),
        source,
    })?;
    ArchiveReader::open(BufReader::new(f))
}

/// Packs the regular files directly inside `input` into `output`.
/// Returns the number of packed files.
pub fn pack(input: &Path, output: &Path) -> ArcResult<usize> {
    pack_with_progress(input, output, &mut silent)
}

pub fn pack_with_progress(
    input: &Path,
    output: &Path,
    progress: &mut dyn FnMut(Progress<'_>),
) -> ArcResult<usize> {
    let files = scan_dir(input)?;
    progress(Progress::Found { count: files.len() });

    // Everything is read before the output is created, so a bad input
    // never leaves an archive behind.
    let archive = collect(&files, progress)?;

    progress(Progress::Writing);
    write_archive(&archive, output)?;

    info!(
        files = archive.len(),
        payload = archive.payload().len(),
        output = %output.display(),
        "packed archive"
    );
    Ok(archive.len())
}

/// Extracts every entry of `archive` into `output` (created if missing).
/// Returns the number of extracted files.
pub fn unpack(archive: &Path, output: &Path, opts: &UnpackOptions) -> ArcResult<usize> {
    unpack_with_progress(archive, output, opts, &mut silent)
}

pub fn unpack_with_progress(
    archive: &Path,
    output: &Path,
    opts: &UnpackOptions,
    progress: &mut dyn FnMut(Progress<'_>),
) -> ArcResult<usize> {
    std::fs::create_dir_all(output).map_err(|source| ArcError::DirectoryCreate {
        path: output.to_path_buf(),
        source,
    })?;

    let mut reader = open_archive(archive)?;
    if reader.entries().is_empty() {
        warn!(archive = %archive.display(), "no files found in archive");
        return Ok(0);
    }

    let n = extract_all(&mut reader, output, opts, progress)?;
    info!(files = n, output = %output.display(), "extracted archive");
    Ok(n)
}

/// Reads the archive index (without extracting payloads).
pub fn entries(archive: &Path) -> ArcResult<Vec<EntryInfo>> {
    Ok(open_archive(archive)?.infos())
}

pub fn list(archive: &Path, verbose: bool) -> ArcResult<()> {
    for e in entries(archive)? {
        if verbose {
            println!(
                "{}  start={} size={} offset={}",
                e.name, e.start, e.size, e.offset
            );
        } else {
            println!("{}", e.name);
        }
    }
    Ok(())
}

/// Checks header, index and that every entry's bytes lie inside the file.
/// Returns the number of entries.
pub fn verify(archive: &Path, opts: &UnpackOptions) -> ArcResult<usize> {
    let reader = open_archive(archive)?;
    let file_len = std::fs::metadata(archive)
        .map_err(|source| ArcError::FileOpen {
            path: archive.to_path_buf(),
            source,
        })?
        .len();

    for e in reader.entries() {
        validate_entry(e, opts)?;
        let end = reader.offset_of(e) + u64::from(e.size);
        if end > file_len {
            return Err(ArcError::IncompleteData {
                name: e.display_name().into_owned(),
                read: file_len.saturating_sub(reader.offset_of(e)),
                expected: e.size,
            });
        }
    }
    Ok(reader.entries().len())
}
