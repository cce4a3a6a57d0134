#![forbid(unsafe_code)]

mod build;
mod error;
mod format;
mod io;
mod ops;
mod path;
mod progress;
mod read;

pub use build::{collect, entry_size, write_archive, Archive};

pub use error::{ArcError, ArcResult};
pub use format::{
    ArchiveHeader, EntryInfo, IndexEntry, ENTRY_LEN, HEADER_LEN, MAGIC, MAX_NAME_LEN,
    NAME_CAPACITY,
};
pub use path::{output_path, scan_dir, validate_name, SourceFile};
pub use progress::{silent, Progress};
pub use read::{extract_all, read_index, validate_entry, ArchiveReader, UnpackOptions};

pub use ops::{entries, list, pack, pack_with_progress, unpack, unpack_with_progress, verify};
