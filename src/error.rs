//! Error types for h2dump.

use thiserror::Error;

/// Every way a dump or split run can fail.
///
/// All variants except [`DumpError::PayloadDecodeFailure`] abort the run.
/// That one is recovered inside the body decoder by falling back to a raw
/// rendering and never leaves it.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Record magic did not match at the given capture offset.
    #[error("malformed container: bad record magic at offset {offset}")]
    MalformedContainer { offset: usize },

    /// Record payload length runs past the end of the capture.
    #[error(
        "truncated record at offset {offset}: \
         length {length} exceeds {available} remaining bytes"
    )]
    TruncatedRecord {
        offset: usize,
        length: usize,
        available: usize,
    },

    /// Frame payload length runs past the end of the logical stream.
    #[error(
        "invalid frame length at offset {offset}: \
         length {length} exceeds {available} remaining bytes"
    )]
    InvalidFrameLength {
        offset: usize,
        length: usize,
        available: usize,
    },

    /// CONTINUATION frame with no open header block to extend.
    #[error("dangling CONTINUATION for stream {stream_id} at offset {offset}")]
    DanglingContinuation { offset: usize, stream_id: u32 },

    /// Pad length does not fit inside the frame payload.
    #[error(
        "invalid padding on stream {stream_id}: \
         pad length {pad_length} with payload of {payload_len} bytes"
    )]
    InvalidPadding {
        stream_id: u32,
        pad_length: usize,
        payload_len: usize,
    },

    /// Accumulated header block grew past the configured limit.
    #[error("header block too large on stream {stream_id} ({size} bytes, max {max})")]
    HeaderBlockTooLarge {
        stream_id: u32,
        size: usize,
        max: usize,
    },

    /// HPACK decoder rejected a header block.
    #[error("header decode failure on stream {stream_id}: {reason}")]
    HeaderDecodeFailure { stream_id: u32, reason: String },

    /// Body was neither gzip nor structured text.
    #[error("payload decode failure: {0}")]
    PayloadDecodeFailure(String),

    /// I/O error reading a capture or writing split output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using DumpError.
pub type Result<T> = std::result::Result<T, DumpError>;
