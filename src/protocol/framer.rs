//! Line framing over the raw serial byte stream.
//!
//! Serial reads deliver arbitrary-sized chunks that rarely align with line
//! boundaries, so the framer keeps the unterminated tail of each read in a
//! pending buffer and splices it onto the next chunk.

use bytes::BytesMut;

use crate::protocol::record::{Record, parse_record};

/// Accumulates raw bytes across reads and drains complete lines as records.
///
/// Every call to [`feed`](Self::feed) drains all complete lines, so between
/// calls the buffer holds at most one incomplete trailing segment.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    /// Creates a new framer with an empty pending buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Appends `data` to the pending buffer and parses every complete line.
    ///
    /// Returns the successfully parsed records in line order. Malformed or
    /// empty segments are skipped silently; they are expected noise from
    /// resync and blank lines. Segments that are not valid UTF-8 are dropped
    /// the same way. If `data` contains no newline the buffer just grows and
    /// an empty vec is returned.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Record> {
        self.buffer.extend_from_slice(data);

        let Some(last_newline) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        // Everything up to and including the last newline is complete; the
        // remainder stays pending for the next read.
        let complete = self.buffer.split_to(last_newline + 1);

        let mut records = Vec::new();
        for segment in complete[..].split(|&b| b == b'\n') {
            let Ok(text) = std::str::from_utf8(segment) else {
                tracing::trace!("dropping undecodable segment: {} bytes", segment.len());
                continue;
            };
            if let Some(record) = parse_record(text) {
                records.push(record);
            }
        }
        records
    }

    /// Returns the number of pending (unterminated) bytes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discards any pending bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
