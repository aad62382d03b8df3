//! Tests for splitting a capture by source id

use std::fs;

use h2dump::{split, DumpError};
use tempfile::tempdir;

use crate::common::record;

#[test]
fn test_split_by_source_id() {
    let first = record(b'W', 4, 1, 0, b"aa");
    let second = record(b'R', 9, 1, 5, b"bbb");
    let third = record(b'W', 4, 2, 0, b"c");
    let mut data = first.clone();
    data.extend_from_slice(&second);
    data.extend_from_slice(&third);

    let dir = tempdir().unwrap();
    let records = split(&data, dir.path()).unwrap();
    assert_eq!(records.len(), 3);

    let mut expected_4 = first;
    expected_4.extend_from_slice(&third);
    assert_eq!(fs::read(dir.path().join("4")).unwrap(), expected_4);
    assert_eq!(fs::read(dir.path().join("9")).unwrap(), second);
}

#[test]
fn test_split_appends_to_existing_files() {
    let data = record(b'W', 1, 0, 0, b"x");
    let dir = tempdir().unwrap();

    split(&data, dir.path()).unwrap();
    split(&data, dir.path()).unwrap();

    let mut expected = data.clone();
    expected.extend_from_slice(&data);
    assert_eq!(fs::read(dir.path().join("1")).unwrap(), expected);
}

#[test]
fn test_split_creates_directory() {
    let data = record(b'W', 2, 0, 0, b"y");
    let dir = tempdir().unwrap();
    let nested = dir.path().join("out").join("fds");

    split(&data, &nested).unwrap();
    assert!(nested.join("2").exists());
}

#[test]
fn test_split_malformed_writes_nothing() {
    let mut data = record(b'W', 3, 0, 0, b"ok");
    data.extend_from_slice(b"BAD");
    data.extend_from_slice(&[0; 17]);
    let dir = tempdir().unwrap();

    assert!(matches!(
        split(&data, dir.path()),
        Err(DumpError::MalformedContainer { offset: 22 })
    ));
    assert!(!dir.path().join("3").exists());
}
