#![forbid(unsafe_code)]

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::arc::error::{ArcError, ArcResult};

/// A regular file found in the input directory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name as raw bytes, before truncation.
    pub name: Vec<u8>,
    pub path: PathBuf,
}

/// Lists the regular files directly inside `input`, in enumeration order.
/// Subdirectories are reported and skipped; nothing is recursed into.
pub fn scan_dir(input: &Path) -> ArcResult<Vec<SourceFile>> {
    let scan_err = |source: std::io::Error| ArcError::DirectoryScan {
        path: input.to_path_buf(),
        source,
    };

    let meta = std::fs::metadata(input).map_err(scan_err)?;
    if !meta.is_dir() {
        return Err(scan_err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "not a directory",
        )));
    }

    let mut files = Vec::new();
    for ent in WalkDir::new(input).min_depth(1).max_depth(1) {
        let ent = ent.map_err(|e| {
            let msg = e.to_string();
            scan_err(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg)),
            )
        })?;

        // Links are resolved here so a dangling one is skipped, not fatal.
        let ft = if ent.path_is_symlink() {
            match std::fs::metadata(ent.path()) {
                Ok(meta) => meta.file_type(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %ent.path().display(), "dangling symlink, skipping");
                    continue;
                }
                Err(e) => return Err(scan_err(e)),
            }
        } else {
            ent.file_type()
        };

        if ft.is_dir() {
            warn!(path = %ent.path().display(), "unsupported subdirectory, skipping");
            continue;
        }
        if !ft.is_file() {
            continue;
        }

        files.push(SourceFile {
            name: name_bytes(ent.file_name()),
            path: ent.into_path(),
        });
    }
    Ok(files)
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Vec<u8> {
    name.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
fn name_os(name: &[u8]) -> ArcResult<OsString> {
    use std::os::unix::ffi::OsStringExt;
    Ok(OsString::from_vec(name.to_vec()))
}

#[cfg(not(unix))]
fn name_os(name: &[u8]) -> ArcResult<OsString> {
    String::from_utf8(name.to_vec())
        .map(OsString::from)
        .map_err(|_| ArcError::Format("entry name is not valid UTF-8".into()))
}

/// Checks that an index name is usable as a single path segment.
pub fn validate_name(name: &[u8]) -> ArcResult<()> {
    if name.is_empty() {
        return Err(ArcError::Format("empty filename found in index".into()));
    }
    #[cfg(not(unix))]
    if std::str::from_utf8(name).is_err() {
        return Err(ArcError::Format(format!(
            "entry name is not valid UTF-8: {}",
            String::from_utf8_lossy(name)
        )));
    }
    if name == b"." || name == b".." || name.iter().any(|&b| b == b'/' || b == b'\\') {
        return Err(ArcError::Format(format!(
            "unsafe filename in index: {}",
            String::from_utf8_lossy(name)
        )));
    }
    Ok(())
}

/// Resolves where an entry is extracted to: `dest/name`, never outside `dest`.
pub fn output_path(dest: &Path, name: &[u8]) -> ArcResult<PathBuf> {
    validate_name(name)?;
    Ok(dest.join(name_os(name)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_traversal_names() {
        for bad in [&b""[..], b".", b"..", b"../evil", b"a/b", b"a\\b"] {
            let err = validate_name(bad).unwrap_err();
            assert!(matches!(err, ArcError::Format(_)), "{bad:?}: {err:?}");
        }
        validate_name(b"script.dat").unwrap();
        validate_name("立ち絵.png".as_bytes()).unwrap();
        validate_name(b"..hidden").unwrap();
    }

    #[test]
    fn output_path_joins_dest() {
        let p = output_path(Path::new("out"), b"a.txt").unwrap();
        assert_eq!(p, Path::new("out").join("a.txt"));
    }

    #[test]
    fn scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.bin"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("inner.bin"), b"i").unwrap();

        let files = scan_dir(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, b"a.bin");
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("target.txt"), b"t").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("target.txt"), dir.path().join("alias.txt"))
            .unwrap();

        let mut names: Vec<Vec<u8>> = scan_dir(dir.path())
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        names.sort();
        assert_eq!(names, [b"a.txt".to_vec(), b"alias.txt".to_vec(), b"target.txt".to_vec()]);

        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("a.arc");
        assert_eq!(crate::arc::pack(dir.path(), &out).unwrap(), 3);
    }

    #[cfg(not(unix))]
    #[test]
    fn non_utf8_name_rejected_before_extraction() {
        let err = validate_name(&[b'a', 0xff, b'b']).unwrap_err();
        assert!(matches!(err, ArcError::Format(_)), "{err:?}");
    }

    #[test]
    fn scan_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ArcError::DirectoryScan { .. }), "{err:?}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn scan_file_instead_of_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("f");
        std::fs::write(&f, b"x").unwrap();
        assert!(matches!(scan_dir(&f), Err(ArcError::DirectoryScan { .. })));
    }
}
