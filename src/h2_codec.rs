//! HTTP/2 frame extraction from a reassembled capture stream.
//!
//! The logical stream is walked once, front to back. At each position the
//! connection preface is checked for first (captures of resumed or restarted
//! connections can carry it anywhere), then one frame is cut out using the
//! 9-byte header. Payloads are copied out as owned buffers so later stages can
//! replace them without touching the capture.
//!
//! Reference: RFC 7540 (HTTP/2) Section 4.1

use std::fmt;

use tracing::{debug, trace, warn};

use crate::error::{DumpError, Result};

/// HTTP/2 frame type codes (RFC 7540 Section 6, RFC 7838, RFC 8336)
pub mod frame_type {
    pub const DATA: u8 = 0x0;
    pub const HEADERS: u8 = 0x1;
    pub const PRIORITY: u8 = 0x2;
    pub const RST_STREAM: u8 = 0x3;
    pub const SETTINGS: u8 = 0x4;
    pub const PUSH_PROMISE: u8 = 0x5;
    pub const PING: u8 = 0x6;
    pub const GOAWAY: u8 = 0x7;
    pub const WINDOW_UPDATE: u8 = 0x8;
    pub const CONTINUATION: u8 = 0x9;
    pub const ALTSVC: u8 = 0xa;
    pub const ORIGIN: u8 = 0xc;
}

/// HTTP/2 frame flags
pub mod flags {
    pub const END_STREAM: u8 = 0x1;
    pub const ACK: u8 = 0x1;
    pub const END_HEADERS: u8 = 0x4;
    pub const PADDED: u8 = 0x8;
    pub const PRIORITY: u8 = 0x20;
}

/// HTTP/2 SETTINGS identifiers (RFC 7540 Section 6.5.2)
pub mod settings_id {
    pub const HEADER_TABLE_SIZE: u16 = 0x1;
    pub const ENABLE_PUSH: u16 = 0x2;
    pub const MAX_CONCURRENT_STREAMS: u16 = 0x3;
    pub const INITIAL_WINDOW_SIZE: u16 = 0x4;
    pub const MAX_FRAME_SIZE: u16 = 0x5;
    pub const MAX_HEADER_LIST_SIZE: u16 = 0x6;
}

/// Size of the fixed frame header.
pub const FRAME_HEADER_SIZE: usize = 9;

/// The HTTP/2 connection preface (24 bytes)
pub const CONNECTION_PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// Check if data starts with HTTP/2 connection preface (h2c detection)
pub fn is_h2c_preface(data: &[u8]) -> bool {
    data.starts_with(CONNECTION_PREFACE)
}

/// Length of the connection preface if it starts at `pos`, otherwise `None`.
pub fn preface_len(data: &[u8], pos: usize) -> Option<usize> {
    data.get(pos..)
        .filter(|rest| is_h2c_preface(rest))
        .map(|_| CONNECTION_PREFACE.len())
}

/// Frame type, with unrecognized codes preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
    AltSvc,
    Origin,
    Unknown(u8),
}

impl FrameType {
    pub fn from_u8(code: u8) -> Self {
        match code {
            frame_type::DATA => FrameType::Data,
            frame_type::HEADERS => FrameType::Headers,
            frame_type::PRIORITY => FrameType::Priority,
            frame_type::RST_STREAM => FrameType::RstStream,
            frame_type::SETTINGS => FrameType::Settings,
            frame_type::PUSH_PROMISE => FrameType::PushPromise,
            frame_type::PING => FrameType::Ping,
            frame_type::GOAWAY => FrameType::GoAway,
            frame_type::WINDOW_UPDATE => FrameType::WindowUpdate,
            frame_type::CONTINUATION => FrameType::Continuation,
            frame_type::ALTSVC => FrameType::AltSvc,
            frame_type::ORIGIN => FrameType::Origin,
            other => FrameType::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            FrameType::Data => frame_type::DATA,
            FrameType::Headers => frame_type::HEADERS,
            FrameType::Priority => frame_type::PRIORITY,
            FrameType::RstStream => frame_type::RST_STREAM,
            FrameType::Settings => frame_type::SETTINGS,
            FrameType::PushPromise => frame_type::PUSH_PROMISE,
            FrameType::Ping => frame_type::PING,
            FrameType::GoAway => frame_type::GOAWAY,
            FrameType::WindowUpdate => frame_type::WINDOW_UPDATE,
            FrameType::Continuation => frame_type::CONTINUATION,
            FrameType::AltSvc => frame_type::ALTSVC,
            FrameType::Origin => frame_type::ORIGIN,
            FrameType::Unknown(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FrameType::Data => "DATA",
            FrameType::Headers => "HEADERS",
            FrameType::Priority => "PRIORITY",
            FrameType::RstStream => "RST_STREAM",
            FrameType::Settings => "SETTINGS",
            FrameType::PushPromise => "PUSH_PROMISE",
            FrameType::Ping => "PING",
            FrameType::GoAway => "GOAWAY",
            FrameType::WindowUpdate => "WINDOW_UPDATE",
            FrameType::Continuation => "CONTINUATION",
            FrameType::AltSvc => "ALTSVC",
            FrameType::Origin => "ORIGIN",
            FrameType::Unknown(_) => "UNKNOWN",
        }
    }

    /// HEADERS and PUSH_PROMISE open a header block.
    pub fn opens_header_block(self) -> bool {
        matches!(self, FrameType::Headers | FrameType::PushPromise)
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed HTTP/2 frame header (9 bytes)
#[derive(Debug, Clone)]
pub struct H2FrameHeader {
    pub length: u32,      // 24 bits
    pub frame_type: u8,
    pub flags: u8,
    pub stream_id: u32,   // 31 bits (high bit reserved)
}

impl H2FrameHeader {
    /// Parse a 9-byte frame header
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < FRAME_HEADER_SIZE {
            return None;
        }

        let length = ((data[0] as u32) << 16) | ((data[1] as u32) << 8) | (data[2] as u32);
        let frame_type = data[3];
        let flags = data[4];
        let stream_id = ((data[5] as u32) << 24)
            | ((data[6] as u32) << 16)
            | ((data[7] as u32) << 8)
            | (data[8] as u32);
        let stream_id = stream_id & 0x7FFFFFFF; // Clear reserved bit

        Some(Self {
            length,
            frame_type,
            flags,
            stream_id,
        })
    }

    /// Total frame size including header
    pub fn total_size(&self) -> usize {
        FRAME_HEADER_SIZE + self.length as usize
    }
}

/// One frame cut from the logical stream.
///
/// `payload` is owned; later stages replace it rather than aliasing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,
    /// Offset of the frame header within the logical stream.
    pub offset: usize,
    /// Promised stream id, filled in once a PUSH_PROMISE block is opened.
    pub promised_stream_id: Option<u32>,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn has_flag(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

/// Frames extracted from a logical stream, plus where prefaces were seen.
#[derive(Debug, Default, Clone)]
pub struct Extracted {
    pub frames: Vec<Frame>,
    pub preface_offsets: Vec<usize>,
}

/// Walk the logical stream and cut it into frames.
///
/// A preface check precedes every frame parse. Parsing stops when fewer than
/// nine bytes remain; those bytes are ignored.
pub fn extract_frames(data: &[u8]) -> Result<Extracted> {
    let mut extracted = Extracted::default();
    let mut pos = 0;

    while data.len() - pos >= FRAME_HEADER_SIZE {
        if let Some(len) = preface_len(data, pos) {
            debug!(offset = pos, "connection preface");
            extracted.preface_offsets.push(pos);
            pos += len;
            continue;
        }

        let header = match H2FrameHeader::parse(&data[pos..]) {
            Some(h) => h,
            None => break,
        };

        let available = data.len() - pos - FRAME_HEADER_SIZE;
        if header.length as usize > available {
            return Err(DumpError::InvalidFrameLength {
                offset: pos,
                length: header.length as usize,
                available,
            });
        }

        let frame_type = FrameType::from_u8(header.frame_type);
        trace!(
            offset = pos,
            frame_type = %frame_type,
            flags = header.flags,
            stream_id = header.stream_id,
            length = header.length,
            "frame"
        );
        let start = pos + FRAME_HEADER_SIZE;
        extracted.frames.push(Frame {
            frame_type,
            flags: header.flags,
            stream_id: header.stream_id,
            offset: pos,
            promised_stream_id: None,
            payload: data[start..start + header.length as usize].to_vec(),
        });
        pos += header.total_size();
    }

    if pos < data.len() {
        warn!(trailing = data.len() - pos, "ignoring trailing bytes shorter than a frame header");
    }
    debug!(frames = extracted.frames.len(), "extracted frames");
    Ok(extracted)
}

/// Parse SETTINGS entries: each is 6 bytes (u16 id + u32 value).
pub fn parse_settings(payload: &[u8]) -> Vec<(u16, u32)> {
    payload
        .chunks_exact(6)
        .map(|entry| {
            let id = u16::from_be_bytes([entry[0], entry[1]]);
            let value = u32::from_be_bytes([entry[2], entry[3], entry[4], entry[5]]);
            (id, value)
        })
        .collect()
}
