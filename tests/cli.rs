use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn arcman(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_arcman"))
        .current_dir(cwd)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn missing_arguments_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let out = arcman(tmp.path(), &["pack"]);
    assert!(!out.status.success());
    assert_ne!(out.status.code(), Some(0));

    let out = arcman(tmp.path(), &[]);
    assert!(!out.status.success());
}

#[test]
fn pack_and_unpack_default_to_output() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("in")).unwrap();
    std::fs::write(tmp.path().join("in").join("a.txt"), b"abc").unwrap();

    let out = arcman(tmp.path(), &["--quiet", "pack", "in"]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    let packed = tmp.path().join("output");
    assert!(packed.is_file());

    std::fs::rename(&packed, tmp.path().join("a.arc")).unwrap();
    let out = arcman(tmp.path(), &["--quiet", "unpack", "a.arc"]);
    assert_eq!(out.status.code(), Some(0), "{out:?}");
    assert_eq!(std::fs::read(tmp.path().join("output").join("a.txt")).unwrap(), b"abc");
}

#[test]
fn bad_magic_exits_with_3() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("bad.arc"), b"NOT AN ARCHIVE AT ALL").unwrap();
    let out = arcman(tmp.path(), &["unpack", "bad.arc", "dest"]);
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("BURIKO ARC20"));
}

#[test]
fn missing_archive_exits_with_2() {
    let tmp = TempDir::new().unwrap();
    let out = arcman(tmp.path(), &["unpack", "nope.arc", "dest"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn truncated_payload_exits_with_6() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("in")).unwrap();
    std::fs::write(tmp.path().join("in").join("f"), [7u8; 64]).unwrap();
    assert!(arcman(tmp.path(), &["-q", "pack", "in", "f.arc"]).status.success());

    let arc = tmp.path().join("f.arc");
    let bytes = std::fs::read(&arc).unwrap();
    std::fs::write(&arc, &bytes[..bytes.len() - 10]).unwrap();

    let out = arcman(tmp.path(), &["-q", "unpack", "f.arc", "dest"]);
    assert_eq!(out.status.code(), Some(6));
}

#[test]
fn verify_reports_entry_count() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("in")).unwrap();
    std::fs::write(tmp.path().join("in").join("x"), b"1").unwrap();
    std::fs::write(tmp.path().join("in").join("y"), b"22").unwrap();
    assert!(arcman(tmp.path(), &["-q", "pack", "in", "v.arc"]).status.success());

    let out = arcman(tmp.path(), &["verify", "v.arc"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "ok: 2 entries");
}
