//! DATA body decoding: gzip, then JSON, then raw bytes.

use std::io::Read;

use flate2::read::MultiGzDecoder;
use serde_json::Value;
use tracing::debug;

use crate::error::{DumpError, Result};

/// A DATA body prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured text, possibly after gunzip.
    Json { value: Value, gzipped: bool },
    /// Gunzipped text that is not structured.
    Text(String),
    /// Neither gzip nor structured text.
    Raw(Vec<u8>),
}

/// Gunzip `data`, decoding every concatenated gzip member.
pub fn try_decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Parse `text` as JSON.
pub fn try_parse_structured(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(text)
}

fn try_decode(data: &[u8]) -> Result<Body> {
    if data.is_empty() {
        return Err(DumpError::PayloadDecodeFailure("empty body".to_string()));
    }
    match try_decompress(data) {
        Ok(inflated) => {
            let text = String::from_utf8_lossy(&inflated).into_owned();
            match try_parse_structured(&text) {
                Ok(value) => Ok(Body::Json { value, gzipped: true }),
                Err(_) => Ok(Body::Text(text)),
            }
        }
        Err(gzip_err) => {
            let failure = |reason: String| {
                DumpError::PayloadDecodeFailure(format!("not gzip ({gzip_err}), {reason}"))
            };
            let text = std::str::from_utf8(data).map_err(|e| failure(format!("not UTF-8 ({e})")))?;
            let value = try_parse_structured(text).map_err(|e| failure(format!("not JSON ({e})")))?;
            Ok(Body::Json { value, gzipped: false })
        }
    }
}

/// Decode a DATA body, falling back to raw bytes when nothing else fits.
pub fn decode_body(data: &[u8]) -> Body {
    match try_decode(data) {
        Ok(body) => body,
        Err(err) => {
            debug!(error = %err, length = data.len(), "showing raw body");
            Body::Raw(data.to_vec())
        }
    }
}

/// Lowercase hex encoding.
pub fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}
