#![forbid(unsafe_code)]

//! Packer and unpacker for BURIKO ARC20 archives.
//!
//! An archive is a 16-byte header, a table of 128-byte index entries and
//! the concatenated file payloads. See [`arc::Archive`] for the layout.

pub mod arc;
