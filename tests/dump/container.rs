//! Tests for container demuxing and stream reassembly

use h2dump::{demux, reassemble, DumpError, RECORD_HEADER_SIZE};

use crate::common::record;

#[test]
fn test_records_in_file_order() {
    let mut data = record(b'W', 3, 10, 20, b"first");
    data.extend(record(b'R', 4, 11, 21, b"second"));

    let records = demux(&data).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].source_id, 3);
    assert_eq!(records[0].payload, b"first");
    assert_eq!(records[1].opcode_char(), 'R');
    assert_eq!(records[1].timestamp_sec, 11);
    assert_eq!(records[1].timestamp_nsec, 21);
    assert_eq!(records[1].payload_offset, RECORD_HEADER_SIZE * 2 + 5);
}

#[test]
fn test_empty_capture() {
    assert!(demux(&[]).unwrap().is_empty());
}

#[test]
fn test_bad_magic_at_start() {
    let mut data = record(b'W', 1, 0, 0, b"x");
    data[0] = b'l';
    assert!(matches!(demux(&data), Err(DumpError::MalformedContainer { offset: 0 })));
}

#[test]
fn test_truncated_second_record() {
    let mut data = record(b'W', 1, 0, 0, b"ok");
    let second = record(b'W', 1, 0, 0, b"truncated");
    data.extend_from_slice(&second[..second.len() - 1]);

    match demux(&data) {
        Err(DumpError::TruncatedRecord { offset, length, available }) => {
            assert_eq!(offset, 22);
            assert_eq!(length, 9);
            assert_eq!(available, 8);
        }
        other => panic!("Expected TruncatedRecord, got {:?}", other),
    }
}

#[test]
fn test_reassemble_interleaved_sources() {
    let mut data = record(b'W', 5, 0, 0, b"AB");
    data.extend(record(b'R', 9, 0, 0, b"12"));
    data.extend(record(b'W', 5, 0, 0, b"CD"));

    let records = demux(&data).unwrap();
    assert_eq!(reassemble(&records), b"AB12CD");
}
