//! Run options for a dump.

/// Maximum accumulated header block size (256 KB).
/// Caps memory spent on runaway CONTINUATION chains in damaged captures.
pub const MAX_HEADER_BLOCK_SIZE: usize = 256 * 1024;

/// Options controlling a single dump run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Largest header block (opening frame plus CONTINUATIONs) accepted.
    pub max_header_block_size: usize,
    /// Print one summary line per container record ahead of the frames.
    pub show_records: bool,
    /// HPACK table-size limit applied before the first frame.
    pub header_table_size: Option<usize>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            max_header_block_size: MAX_HEADER_BLOCK_SIZE,
            show_records: true,
            header_table_size: None,
        }
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_header_block_size(mut self, size: usize) -> Self {
        self.max_header_block_size = size;
        self
    }

    pub fn with_show_records(mut self, show: bool) -> Self {
        self.show_records = show;
        self
    }

    pub fn with_header_table_size(mut self, size: Option<usize>) -> Self {
        self.header_table_size = size;
        self
    }
}
