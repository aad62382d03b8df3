//! HPACK: Header Compression for HTTP/2 (RFC 7541)
//!
//! Thin wrapper around `fluke-hpack` providing the H2Header type and the
//! decoder used to expand captured header blocks. One decoder is carried
//! through a whole dump, since HPACK state spans the connection.

/// A decoded HTTP/2 header
#[derive(Debug, Clone, PartialEq)]
pub struct H2Header {
    pub name: String,
    pub value: String,
}

impl H2Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// HPACK decoder for HTTP/2 header blocks.
/// Wraps `fluke_hpack::Decoder` which maintains dynamic table state per-connection.
pub struct HpackDecoder {
    inner: fluke_hpack::Decoder<'static>,
}

impl std::fmt::Debug for HpackDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpackDecoder").finish()
    }
}

impl Default for HpackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackDecoder {
    pub fn new() -> Self {
        Self {
            inner: fluke_hpack::Decoder::new(),
        }
    }

    /// Cap the dynamic table size, as announced by SETTINGS_HEADER_TABLE_SIZE.
    ///
    /// The current table is left alone; the cap only rejects later
    /// dynamic table size updates that exceed it.
    pub fn set_table_size(&mut self, size: usize) {
        self.inner.set_max_allowed_table_size(size);
    }

    /// Drop all dynamic table state, as after a GOAWAY.
    pub fn reset(&mut self) {
        self.inner = fluke_hpack::Decoder::new();
    }

    /// Decode an HPACK-encoded header block into H2Headers.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<H2Header>, String> {
        let pairs = self.inner.decode(data).map_err(|e| format!("HPACK decode error: {:?}", e))?;
        Ok(pairs
            .into_iter()
            .map(|(name, value)| {
                H2Header::new(
                    String::from_utf8_lossy(&name).into_owned(),
                    String::from_utf8_lossy(&value).into_owned(),
                )
            })
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
