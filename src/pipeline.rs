//! The dump pipeline: capture bytes in, fully decoded report out.
//!
//! ```text
//! capture → demux → reassemble → extract frames → defragment → merge DATA → decode
//! ```
//!
//! The run is all-or-nothing: any fatal error aborts it before a report exists.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::assembly::{defragment, merge_data};
use crate::body::{decode_body, Body};
use crate::config::DumpOptions;
use crate::container::{demux, reassemble, Record};
use crate::error::{DumpError, Result};
use crate::h2_codec::{extract_frames, flags, parse_settings, settings_id, Frame, FrameType};
use crate::hpack::{H2Header, HpackDecoder};

/// Capture metadata of one container record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub opcode: char,
    pub source_id: u32,
    pub timestamp_sec: u32,
    pub timestamp_nsec: u32,
    pub payload_offset: usize,
    pub length: usize,
}

impl From<&Record<'_>> for RecordSummary {
    fn from(record: &Record<'_>) -> Self {
        Self {
            opcode: record.opcode_char(),
            source_id: record.source_id,
            timestamp_sec: record.timestamp_sec,
            timestamp_nsec: record.timestamp_nsec,
            payload_offset: record.payload_offset,
            length: record.len(),
        }
    }
}

/// What a frame carries once decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameContent {
    /// Nothing beyond the frame header is shown.
    Metadata,
    /// Decoded header list of a HEADERS or PUSH_PROMISE block.
    Headers(Vec<H2Header>),
    /// A non-empty DATA body.
    Body(Body),
}

/// A frame ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,
    pub promised_stream_id: Option<u32>,
    /// Offset of the (first) frame header within the logical stream.
    pub offset: usize,
    /// Payload length after defragmentation, padding removal and merging.
    pub length: usize,
    pub content: FrameContent,
}

/// Everything a dump run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub records: Vec<RecordSummary>,
    pub preface_offsets: Vec<usize>,
    pub frames: Vec<DecodedFrame>,
    pub show_records: bool,
}

/// Decode header blocks and bodies, in frame order.
///
/// SETTINGS frames carrying a header table size resize the decoder and GOAWAY
/// replaces it with a fresh one, so the decoder sees the same table state the
/// receiving peer did.
pub fn decode_frames(
    frames: Vec<Frame>,
    decoder: &mut HpackDecoder,
) -> Result<Vec<DecodedFrame>> {
    let mut decoded = Vec::with_capacity(frames.len());

    for frame in frames {
        let content = match frame.frame_type {
            FrameType::Settings if !frame.has_flag(flags::ACK) => {
                for (id, value) in parse_settings(&frame.payload) {
                    if id == settings_id::HEADER_TABLE_SIZE {
                        debug!(size = value, "header table size update");
                        decoder.set_table_size(value as usize);
                    }
                }
                FrameContent::Metadata
            }
            FrameType::GoAway => {
                debug!(stream_id = frame.stream_id, "GOAWAY, resetting header decoder");
                decoder.reset();
                FrameContent::Metadata
            }
            ty if ty.opens_header_block() => {
                let headers = decoder
                    .decode(&frame.payload)
                    .map_err(|reason| DumpError::HeaderDecodeFailure {
                        stream_id: frame.stream_id,
                        reason,
                    })?;
                FrameContent::Headers(headers)
            }
            FrameType::Data if !frame.payload.is_empty() => {
                FrameContent::Body(decode_body(&frame.payload))
            }
            _ => FrameContent::Metadata,
        };

        decoded.push(DecodedFrame {
            frame_type: frame.frame_type,
            flags: frame.flags,
            stream_id: frame.stream_id,
            promised_stream_id: frame.promised_stream_id,
            offset: frame.offset,
            length: frame.payload.len(),
            content,
        });
    }

    Ok(decoded)
}

/// Run the whole pipeline over an in-memory capture.
pub fn run(capture: &[u8], options: &DumpOptions) -> Result<Report> {
    let records = demux(capture)?;
    let stream = reassemble(&records);
    debug!(records = records.len(), bytes = stream.len(), "reassembled logical stream");

    let extracted = extract_frames(&stream)?;
    let frames = defragment(extracted.frames, options.max_header_block_size)?;
    let frames = merge_data(frames)?;

    let mut decoder = HpackDecoder::new();
    if let Some(size) = options.header_table_size {
        decoder.set_table_size(size);
    }
    let frames = decode_frames(frames, &mut decoder)?;

    Ok(Report {
        records: records.iter().map(RecordSummary::from).collect(),
        preface_offsets: extracted.preface_offsets,
        frames,
        show_records: options.show_records,
    })
}

/// Read a capture file and run the pipeline over it.
pub fn dump_file(path: &Path, options: &DumpOptions) -> Result<Report> {
    let capture = fs::read(path)?;
    info!(path = %path.display(), bytes = capture.len(), "loaded capture");
    run(&capture, options)
}
