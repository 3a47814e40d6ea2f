//! Tests that drive the built `truncpad` binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn truncpad() -> Command {
    cargo_bin_cmd!("truncpad")
}

#[test]
fn test_creates_and_extends() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("new.bin");

    truncpad().args(["-s", "100"]).arg(&file).assert().success();

    assert_eq!(fs::read(&file).unwrap(), vec![0u8; 100]);
}

#[test]
fn test_pads_with_character() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("pad.bin");
    fs::write(&file, b"xy").unwrap();

    truncpad()
        .args(["-s", "+6", "-C", "0x41"])
        .arg(&file)
        .assert()
        .success();

    assert_eq!(fs::read(&file).unwrap(), b"xyAAAAAA");
}

#[test]
fn test_negative_delta() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("shrink.bin");
    fs::write(&file, vec![1u8; 1000]).unwrap();

    truncpad()
        .args(["-s", "-100"])
        .arg(&file)
        .assert()
        .success();

    assert_eq!(fs::metadata(&file).unwrap().len(), 900);
}

#[test]
fn test_reference_only() {
    let temp = TempDir::new().unwrap();
    let reference = temp.path().join("ref.bin");
    let file = temp.path().join("target.bin");
    fs::write(&reference, vec![0u8; 321]).unwrap();

    truncpad()
        .arg("-r")
        .arg(&reference)
        .arg(&file)
        .assert()
        .success();

    assert_eq!(fs::metadata(&file).unwrap().len(), 321);
}

#[test]
fn test_no_create_leaves_missing_file_alone() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("absent.bin");

    truncpad()
        .args(["-c", "-s", "10"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    assert!(!file.exists());
}

#[test]
fn test_missing_size_and_reference() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");

    truncpad()
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--size"));

    assert!(!file.exists());
}

#[test]
fn test_absolute_size_with_reference_is_rejected() {
    let temp = TempDir::new().unwrap();
    let reference = temp.path().join("ref.bin");
    let file = temp.path().join("f");
    fs::write(&reference, b"abc").unwrap();

    truncpad()
        .args(["-s", "10", "-r"])
        .arg(&reference)
        .arg(&file)
        .assert()
        .failure();

    assert!(!file.exists());
}

#[test]
fn test_missing_file_operand() {
    truncpad()
        .args(["-s", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing file operand"));
}

#[test]
fn test_invalid_size_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");

    truncpad()
        .args(["-s", "10X"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("10X"));

    assert!(!file.exists());
}

#[test]
fn test_zero_modulus() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");

    truncpad()
        .args(["-s", "%0"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("division by zero"));
}

#[test]
fn test_bad_pad_code() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");

    truncpad()
        .args(["-s", "10", "-C", "256"])
        .arg(&file)
        .assert()
        .failure();

    assert!(!file.exists());
}

#[test]
fn test_failing_file_does_not_stop_others() {
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("good.bin");

    truncpad()
        .args(["-s", "5"])
        .arg(temp.path())
        .arg(&good)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("truncpad: "));

    assert_eq!(fs::metadata(&good).unwrap().len(), 5);
}

#[test]
fn test_repeated_size_last_wins() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("twice.bin");

    truncpad()
        .args(["-s", "100", "-s", "7"])
        .arg(&file)
        .assert()
        .success();

    assert_eq!(fs::metadata(&file).unwrap().len(), 7);
}

#[test]
fn test_usage_error_exits_one() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");

    truncpad()
        .args(["--no-such-option", "-s", "1"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--no-such-option"));

    assert!(!file.exists());
}

#[test]
fn test_version() {
    truncpad()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_long_help_documents_units() {
    truncpad()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("round up to multiple of"))
        .stdout(predicate::str::contains("KiB"));
}
