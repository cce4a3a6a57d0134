#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file format: {0}")]
    Format(String),

    #[error("file too large (max 4GB): {} ({size} bytes)", .path.display())]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("archive payload too large (max 4GB): {size} bytes")]
    ArchiveTooLarge { size: u64 },

    #[error("failed to scan input directory {}: {source}", .path.display())]
    DirectoryScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {}: {source}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open file {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {what}: {source}")]
    Read {
        what: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to determine data position: {0}")]
    DataPosition(#[source] std::io::Error),

    #[error("failed to seek to data for file {name}: {source}")]
    Seek {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("incomplete data for file {name} (read {read}/{expected} bytes)")]
    IncompleteData { name: String, read: u64, expected: u32 },
}

impl ArcError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DirectoryScan { .. }
            | Self::DirectoryCreate { .. }
            | Self::FileOpen { .. }
            | Self::OutputWrite { .. }
            | Self::FileTooLarge { .. }
            | Self::ArchiveTooLarge { .. } => 2,
            Self::Format(_) => 3,
            Self::DataPosition(_) => 4,
            Self::Seek { .. } => 5,
            Self::Io(_) | Self::Read { .. } | Self::IncompleteData { .. } => 6,
        }
    }
}

pub type ArcResult<T> = Result<T, ArcError>;
