//! Tests for HPACK dynamic table handling across header blocks

use h2dump::{H2Header, HpackDecoder};

// Literal with incremental indexing, new name: "x-trace: abc"
const INDEXED_LITERAL: [u8; 13] = [
    0x40, 0x07, b'x', b'-', b't', b'r', b'a', b'c', b'e',
    0x03, b'a', b'b', b'c',
];

#[test]
fn test_dynamic_entry_reused() {
    let mut decoder = HpackDecoder::new();
    decoder.decode(&INDEXED_LITERAL).unwrap();

    // 0xbe = index 62, the newest dynamic entry
    let headers = decoder.decode(&[0xbe]).unwrap();
    assert_eq!(headers, vec![H2Header::new("x-trace", "abc")]);
}

#[test]
fn test_reset_forgets_dynamic_entries() {
    let mut decoder = HpackDecoder::new();
    decoder.decode(&INDEXED_LITERAL).unwrap();
    decoder.reset();

    assert!(decoder.decode(&[0xbe]).is_err());
    // Static table still works
    assert_eq!(decoder.decode(&[0x82]).unwrap(), vec![H2Header::new(":method", "GET")]);
}

#[test]
fn test_table_size_update_within_limit() {
    let mut decoder = HpackDecoder::new();
    decoder.set_table_size(4096);

    // 0x3f 0xe1 0x1f = dynamic table size update to 4096, then :method: GET
    let headers = decoder.decode(&[0x3f, 0xe1, 0x1f, 0x82]).unwrap();
    assert_eq!(headers, vec![H2Header::new(":method", "GET")]);
}

#[test]
fn test_table_size_cap_keeps_existing_entries() {
    let mut decoder = HpackDecoder::new();
    decoder.decode(&INDEXED_LITERAL).unwrap();
    decoder.set_table_size(0);

    let headers = decoder.decode(&[0xbe]).unwrap();
    assert_eq!(headers, vec![H2Header::new("x-trace", "abc")]);
}

#[test]
fn test_table_size_update_over_cap_fails() {
    let mut decoder = HpackDecoder::new();
    decoder.set_table_size(256);

    // 0x3f 0xe1 0x1f = dynamic table size update to 4096
    assert!(decoder.decode(&[0x3f, 0xe1, 0x1f, 0x82]).is_err());
}

#[test]
fn test_table_size_update_at_cap_succeeds() {
    let mut decoder = HpackDecoder::new();
    decoder.set_table_size(256);

    // 0x3f 0xe1 0x01 = dynamic table size update to 256
    let headers = decoder.decode(&[0x3f, 0xe1, 0x01, 0x82]).unwrap();
    assert_eq!(headers, vec![H2Header::new(":method", "GET")]);
}
