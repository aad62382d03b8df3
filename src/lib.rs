//! h2dump: offline decoder for captured HTTP/2 connections
//!
//! Captures are files of length-prefixed records, each wrapping a slice of
//! the raw bytes of one HTTP/2 connection as seen by an instrumented proxy or
//! server. This crate turns such a capture into a readable frame listing.
//!
//! # Features
//!
//! - **Container demuxing**: validates record magic and lengths
//! - **Preface detection**: skips the client connection preface wherever it appears
//! - **Frame extraction**: every frame type, unknown codes included
//! - **CONTINUATION Assembly**: header blocks folded back into their HEADERS/PUSH_PROMISE
//! - **DATA merging**: padding stripped, bodies joined per stream
//! - **HPACK Support**: header lists decoded via fluke-hpack, with table state
//!   following SETTINGS and GOAWAY
//! - **Body decoding**: gzip and JSON bodies shown decoded, everything else as hex
//!
//! # Quick Start
//!
//! ```rust
//! use h2dump::{run, DumpOptions};
//!
//! // One record: magic, opcode 'W', source 7, timestamp 0.0, then the payload
//! let frame = [0, 0, 2, 0, 1, 0, 0, 0, 1, b'h', b'i'];
//! let mut capture = b"LogW".to_vec();
//! capture.extend_from_slice(&7u32.to_be_bytes());
//! capture.extend_from_slice(&[0; 8]);
//! capture.extend_from_slice(&(frame.len() as u32).to_be_bytes());
//! capture.extend_from_slice(&frame);
//!
//! let report = run(&capture, &DumpOptions::default()).unwrap();
//! assert_eq!(report.frames.len(), 1);
//! print!("{}", report);
//! ```
//!
//! # Architecture
//!
//! Data flows strictly forward, one stage per module:
//! - [`container`]: capture bytes → records → logical stream
//! - [`h2_codec`]: logical stream → frames
//! - [`assembly`]: frames → defragmented, merged frames
//! - [`pipeline`]: HPACK and body decoding, and the [`run`] entry point
//! - [`render`]: report → text

pub mod assembly;
pub mod body;
pub mod config;
pub mod container;
pub mod error;
pub mod h2_codec;
pub mod hpack;
pub mod pipeline;
pub mod render;

pub use assembly::{defragment, merge_data, strip_padding};
pub use body::{decode_body, Body};
pub use config::{DumpOptions, MAX_HEADER_BLOCK_SIZE};
pub use container::{demux, reassemble, split, Record, RECORD_HEADER_SIZE, RECORD_MAGIC};
pub use error::{DumpError, Result};
pub use h2_codec::{
    extract_frames, flags, frame_type, is_h2c_preface, preface_len, settings_id, Extracted, Frame,
    FrameType, H2FrameHeader, CONNECTION_PREFACE, FRAME_HEADER_SIZE,
};
pub use hpack::{H2Header, HpackDecoder};
pub use pipeline::{
    decode_frames, dump_file, run, DecodedFrame, FrameContent, RecordSummary, Report,
};
