//! Cross-frame reassembly: header block defragmentation and DATA merging.
//!
//! Both passes consume the frame list of the previous stage and return a new
//! one. Neither looks back at a frame once it has been emitted, except to
//! extend the payload of the frame currently accumulating bytes.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::error::{DumpError, Result};
use crate::h2_codec::{flags, Frame, FrameType};

/// Strip DATA padding: the leading pad-length byte and `pad_length` trailing
/// bytes. Frames without the PADDED flag are returned untouched.
pub fn strip_padding(frame: &Frame, mut payload: Vec<u8>) -> Result<Vec<u8>> {
    if !frame.has_flag(flags::PADDED) {
        return Ok(payload);
    }
    let pad_length = payload.first().copied().map(usize::from).ok_or(DumpError::InvalidPadding {
        stream_id: frame.stream_id,
        pad_length: 0,
        payload_len: 0,
    })?;
    if pad_length + 1 > payload.len() {
        return Err(DumpError::InvalidPadding {
            stream_id: frame.stream_id,
            pad_length,
            payload_len: payload.len(),
        });
    }
    // Remove padding from end, then remove pad_length byte from start
    payload.truncate(payload.len() - pad_length);
    payload.remove(0);
    Ok(payload)
}

/// Reduce a HEADERS or PUSH_PROMISE payload to its header block fragment.
///
/// Handles PADDED and PRIORITY on HEADERS, PADDED and the promised stream id
/// on PUSH_PROMISE. Returns the fragment and, for PUSH_PROMISE, the promised id.
fn header_block_fragment(frame: &Frame, mut payload: Vec<u8>) -> Result<(Vec<u8>, Option<u32>)> {
    let mut offset = 0;
    let mut pad_length = 0;

    if frame.has_flag(flags::PADDED) {
        pad_length = payload.first().copied().map(usize::from).unwrap_or(0);
        offset = 1;
    }

    let mut promised = None;
    let fixed = match frame.frame_type {
        FrameType::Headers if frame.has_flag(flags::PRIORITY) => 5, // dependency (4) + weight (1)
        FrameType::PushPromise => 4,
        _ => 0,
    };

    if offset + fixed + pad_length > payload.len() {
        return Err(DumpError::InvalidPadding {
            stream_id: frame.stream_id,
            pad_length,
            payload_len: payload.len(),
        });
    }

    if frame.frame_type == FrameType::PushPromise {
        let id = &payload[offset..offset + 4];
        promised = Some(u32::from_be_bytes([id[0], id[1], id[2], id[3]]) & 0x7FFFFFFF);
    }
    offset += fixed;

    // Need subrange: truncate end first, then drain start
    payload.truncate(payload.len() - pad_length);
    if offset > 0 {
        payload.drain(..offset);
    }
    Ok((payload, promised))
}

/// Fold CONTINUATION frames into the header block they continue.
///
/// Each CONTINUATION extends the most recently emitted frame, which must be a
/// HEADERS or PUSH_PROMISE. Header blocks of different streams are assumed not
/// to interleave; a stream id mismatch is logged and merged anyway.
pub fn defragment(frames: Vec<Frame>, max_header_block_size: usize) -> Result<Vec<Frame>> {
    let mut out: Vec<Frame> = Vec::with_capacity(frames.len());

    for mut frame in frames {
        match frame.frame_type {
            FrameType::Continuation => {
                let last = match out.last_mut() {
                    Some(last) if last.frame_type.opens_header_block() => last,
                    _ => {
                        return Err(DumpError::DanglingContinuation {
                            offset: frame.offset,
                            stream_id: frame.stream_id,
                        })
                    }
                };
                if last.stream_id != frame.stream_id {
                    warn!(
                        open_stream = last.stream_id,
                        stream_id = frame.stream_id,
                        "CONTINUATION stream differs from open header block"
                    );
                }
                // Guard against unbounded header block accumulation
                let new_size = last.payload.len() + frame.payload.len();
                if new_size > max_header_block_size {
                    return Err(DumpError::HeaderBlockTooLarge {
                        stream_id: last.stream_id,
                        size: new_size,
                        max: max_header_block_size,
                    });
                }
                trace!(
                    stream_id = last.stream_id,
                    added = frame.payload.len(),
                    "continuation merged"
                );
                last.payload.extend_from_slice(&frame.payload);
            }
            ty if ty.opens_header_block() => {
                let payload = std::mem::take(&mut frame.payload);
                let (fragment, promised) = header_block_fragment(&frame, payload)?;
                if fragment.len() > max_header_block_size {
                    return Err(DumpError::HeaderBlockTooLarge {
                        stream_id: frame.stream_id,
                        size: fragment.len(),
                        max: max_header_block_size,
                    });
                }
                frame.payload = fragment;
                frame.promised_stream_id = promised;
                out.push(frame);
            }
            _ => out.push(frame),
        }
    }

    debug!(frames = out.len(), "defragmented header blocks");
    Ok(out)
}

/// Merge every DATA frame of a stream into the first DATA frame seen for it.
///
/// Padding is stripped from each frame before merging. The first frame keeps
/// its type and flags; later frames only contribute payload bytes.
pub fn merge_data(frames: Vec<Frame>) -> Result<Vec<Frame>> {
    let mut out: Vec<Frame> = Vec::with_capacity(frames.len());
    let mut bodies: HashMap<u32, usize> = HashMap::new();

    for mut frame in frames {
        if frame.frame_type != FrameType::Data {
            out.push(frame);
            continue;
        }

        let payload = std::mem::take(&mut frame.payload);
        let payload = strip_padding(&frame, payload)?;

        match bodies.get(&frame.stream_id) {
            Some(&index) => {
                trace!(stream_id = frame.stream_id, added = payload.len(), "data merged");
                out[index].payload.extend_from_slice(&payload);
            }
            None => {
                bodies.insert(frame.stream_id, out.len());
                frame.payload = payload;
                out.push(frame);
            }
        }
    }

    debug!(frames = out.len(), streams = bodies.len(), "merged data frames");
    Ok(out)
}
