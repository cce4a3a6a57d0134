#![forbid(unsafe_code)]

use std::borrow::Cow;

/// Progress events emitted by pack and unpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<'a> {
    /// Regular files found in the input directory.
    Found { count: usize },
    /// About to read the `index`-th (1-based) of `total` input files.
    Packing {
        index: usize,
        total: usize,
        name: Cow<'a, str>,
    },
    /// All inputs are in memory; the archive file is being written.
    Writing,
    /// About to extract the `index`-th (1-based) of `total` entries.
    Extracting {
        index: usize,
        total: usize,
        name: Cow<'a, str>,
    },
}

/// Observer that drops every event.
pub fn silent(_: Progress<'_>) {}
