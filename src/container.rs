//! Capture container demuxing.
//!
//! A capture file is a sequence of records, each a fixed 20-byte header
//! followed by `length` payload bytes:
//!
//! ```text
//! +-----------+--------+-------------+-----------+------------+------------+
//! | magic (3) | op (1) | source (32) | sec (32)  | nsec (32)  | length (32)|
//! +-----------+--------+-------------+-----------+------------+------------+
//! |                      payload (length bytes)                            |
//! +------------------------------------------------------------------------+
//! ```
//!
//! All integers are big-endian. Payloads are raw wire bytes of one HTTP/2
//! connection, split at arbitrary points by the capturing process.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::error::{DumpError, Result};

/// Record magic literal.
pub const RECORD_MAGIC: &[u8; 3] = b"Log";

/// Size of the fixed record header.
pub const RECORD_HEADER_SIZE: usize = 20;

/// One container record, borrowing its payload from the capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    /// Capture direction / event type, usually an ASCII letter.
    pub opcode: u8,
    /// Originating file descriptor or channel.
    pub source_id: u32,
    pub timestamp_sec: u32,
    pub timestamp_nsec: u32,
    /// Offset of the payload within the capture buffer.
    pub payload_offset: usize,
    pub payload: &'a [u8],
}

impl<'a> Record<'a> {
    /// Payload length as declared in the header.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Opcode as a printable character.
    pub fn opcode_char(&self) -> char {
        self.opcode as char
    }

    /// Encode the full record (header + payload).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RECORD_HEADER_SIZE + self.payload.len());
        out.extend_from_slice(RECORD_MAGIC);
        out.push(self.opcode);
        out.extend_from_slice(&self.source_id.to_be_bytes());
        out.extend_from_slice(&self.timestamp_sec.to_be_bytes());
        out.extend_from_slice(&self.timestamp_nsec.to_be_bytes());
        out.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        out.extend_from_slice(self.payload);
        out
    }
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// Split a capture buffer into records, in file order.
///
/// Stops when fewer than [`RECORD_HEADER_SIZE`] bytes remain; those trailing
/// bytes are ignored.
pub fn demux(data: &[u8]) -> Result<Vec<Record<'_>>> {
    let mut records = Vec::new();
    let mut pos = 0;

    while data.len() - pos >= RECORD_HEADER_SIZE {
        if &data[pos..pos + 3] != RECORD_MAGIC {
            return Err(DumpError::MalformedContainer { offset: pos });
        }
        let opcode = data[pos + 3];
        let source_id = read_u32(data, pos + 4);
        let timestamp_sec = read_u32(data, pos + 8);
        let timestamp_nsec = read_u32(data, pos + 12);
        let length = read_u32(data, pos + 16) as usize;

        let payload_offset = pos + RECORD_HEADER_SIZE;
        let available = data.len() - payload_offset;
        if length > available {
            return Err(DumpError::TruncatedRecord {
                offset: pos,
                length,
                available,
            });
        }

        trace!(
            offset = pos,
            opcode = %(opcode as char),
            source_id,
            length,
            "container record"
        );
        records.push(Record {
            opcode,
            source_id,
            timestamp_sec,
            timestamp_nsec,
            payload_offset,
            payload: &data[payload_offset..payload_offset + length],
        });
        pos = payload_offset + length;
    }

    if pos < data.len() {
        warn!(trailing = data.len() - pos, "ignoring trailing bytes shorter than a record header");
    }
    debug!(records = records.len(), "demuxed capture");
    Ok(records)
}

/// Concatenate record payloads, in record order, into one logical stream.
///
/// Records from every source id land in the same stream.
pub fn reassemble(records: &[Record<'_>]) -> Vec<u8> {
    let total = records.iter().map(Record::len).sum();
    let mut stream = Vec::with_capacity(total);
    for record in records {
        stream.extend_from_slice(record.payload);
    }
    stream
}

/// Append each record, header included, to `<directory>/<source_id>`.
///
/// The whole capture is demuxed before anything is written, so a malformed
/// capture leaves the directory untouched. Returns the records written.
pub fn split<'a>(data: &'a [u8], directory: &Path) -> Result<Vec<Record<'a>>> {
    let records = demux(data)?;
    fs::create_dir_all(directory)?;

    for record in &records {
        let path = directory.join(record.source_id.to_string());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(&record.to_bytes())?;
        trace!(path = %path.display(), length = record.len(), "appended record");
    }
    debug!(records = records.len(), directory = %directory.display(), "split capture");
    Ok(records)
}
