//! Positional chunking of retrieved log batches

use crate::types::LogRecord;

/// Split a retrieved batch into contiguous windows of at most `size` records.
///
/// Order is preserved and every record appears in exactly one window; the
/// last window may be shorter. Panics if `size` is zero.
pub fn chunks(records: &[LogRecord], size: usize) -> impl Iterator<Item = &[LogRecord]> {
    assert!(size > 0, "chunk size must be positive");
    records.chunks(size)
}

/// Number of classification calls a batch of `len` records will need
pub fn chunk_count(len: usize, size: usize) -> usize {
    len.div_ceil(size)
}
