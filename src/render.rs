//! Plain-text rendering of a dump report.

use std::fmt;

use crate::body::{to_hex, Body};
use crate::pipeline::{DecodedFrame, FrameContent, RecordSummary, Report};

impl fmt::Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "==== record: opcode:{}, source:{}, sec:{}, nsec:{}, pos:{}, len:{} ====",
            self.opcode,
            self.source_id,
            self.timestamp_sec,
            self.timestamp_nsec,
            self.payload_offset,
            self.length
        )
    }
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &Body) -> fmt::Result {
    match body {
        Body::Json { value, gzipped } => {
            if *gzipped {
                writeln!(f, "  -- gzipped")?;
            }
            let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
            writeln!(f, "{}", pretty)
        }
        Body::Text(text) => {
            writeln!(f, "  -- gzipped")?;
            writeln!(f, "{}", text)
        }
        Body::Raw(bytes) => {
            writeln!(f, "  -- data not gzipped nor structured")?;
            writeln!(f, "raw: {}", to_hex(bytes))
        }
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "---- frame: type:{} ({}), flags:{}, stream:{}",
            self.frame_type.code(),
            self.frame_type,
            self.flags,
            self.stream_id
        )?;
        if let Some(promised) = self.promised_stream_id {
            write!(f, ", promised:{}", promised)?;
        }
        writeln!(f, ", len:{} ----", self.length)?;

        match &self.content {
            FrameContent::Metadata => Ok(()),
            FrameContent::Headers(headers) => {
                for header in headers {
                    writeln!(f, "  {}: {}", header.name, header.value)?;
                }
                Ok(())
            }
            FrameContent::Body(body) => write_body(f, body),
        }
    }
}

fn write_preface(f: &mut fmt::Formatter<'_>, offset: usize) -> fmt::Result {
    writeln!(f, "  -- http2 preface string at offset {}", offset)
}

/// Preface notes are interleaved with frames in stream order.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.show_records {
            for record in &self.records {
                writeln!(f, "{}", record)?;
            }
        }
        let mut prefaces = self.preface_offsets.iter().copied().peekable();
        for frame in &self.frames {
            while let Some(offset) = prefaces.next_if(|&offset| offset < frame.offset) {
                write_preface(f, offset)?;
            }
            write!(f, "{}", frame)?;
        }
        for offset in prefaces {
            write_preface(f, offset)?;
        }
        Ok(())
    }
}
