//! Property tests for demuxing, defragmentation and merging

use h2dump::{
    defragment, demux, extract_frames, flags, frame_type, merge_data, reassemble, strip_padding,
    FrameType, MAX_HEADER_BLOCK_SIZE, RECORD_HEADER_SIZE,
};
use proptest::prelude::*;

use crate::common::{frame, record};

fn payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..8)
}

proptest! {
    #[test]
    fn demux_consumes_all_but_short_trailer(
        chunks in payloads(),
        trailer in 0usize..RECORD_HEADER_SIZE,
    ) {
        let mut data = Vec::new();
        for chunk in &chunks {
            data.extend(record(b'W', 1, 0, 0, chunk));
        }
        let body_len = data.len();
        data.extend(std::iter::repeat(b'L').take(trailer));

        let records = demux(&data).unwrap();
        let consumed: usize = records.iter().map(|r| RECORD_HEADER_SIZE + r.len()).sum();
        prop_assert_eq!(consumed, body_len);
    }

    #[test]
    fn reassembly_resplits_to_same_payloads(chunks in payloads()) {
        let mut data = Vec::new();
        for chunk in &chunks {
            data.extend(record(b'R', 2, 0, 0, chunk));
        }
        let records = demux(&data).unwrap();
        let stream = reassemble(&records);

        let mut pos = 0;
        for (record, chunk) in records.iter().zip(&chunks) {
            prop_assert_eq!(&stream[pos..pos + record.len()], chunk.as_slice());
            pos += record.len();
        }
        prop_assert_eq!(pos, stream.len());
    }

    #[test]
    fn continuation_payloads_concatenate(chunks in payloads()) {
        let mut data = frame(frame_type::HEADERS, 0, 1, &chunks[0]);
        for chunk in &chunks[1..] {
            data.extend(frame(frame_type::CONTINUATION, 0, 1, chunk));
        }
        let extracted = extract_frames(&data).unwrap();
        let frames = defragment(extracted.frames, MAX_HEADER_BLOCK_SIZE).unwrap();

        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(&frames[0].payload, &chunks.concat());
    }

    #[test]
    fn unpadded_data_concatenates(chunks in payloads(), stream_id in 1u32..0x7fff_ffff) {
        let mut data = Vec::new();
        for chunk in &chunks {
            data.extend(frame(frame_type::DATA, 0, stream_id, chunk));
        }
        let frames = merge_data(extract_frames(&data).unwrap().frames).unwrap();

        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].stream_id, stream_id);
        prop_assert_eq!(&frames[0].payload, &chunks.concat());
    }

    #[test]
    fn padding_strips_exactly_pad_plus_one(
        body in prop::collection::vec(any::<u8>(), 0..64),
        pad in 0u8..32,
    ) {
        let mut payload = vec![pad];
        payload.extend_from_slice(&body);
        payload.extend(std::iter::repeat(0xaa).take(pad as usize));
        let data = frame(frame_type::DATA, flags::PADDED, 1, &payload);
        let extracted = extract_frames(&data).unwrap();
        let f = &extracted.frames[0];

        let stripped = strip_padding(f, f.payload.clone()).unwrap();
        prop_assert_eq!(stripped.len(), payload.len() - 1 - pad as usize);
        prop_assert_eq!(stripped, body);
    }

    #[test]
    fn unknown_types_never_abort(
        code in 0xdu8..=0xff,
        payload in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let extracted = extract_frames(&frame(code, 0, 1, &payload)).unwrap();
        prop_assert_eq!(extracted.frames[0].frame_type, FrameType::Unknown(code));
    }
}
