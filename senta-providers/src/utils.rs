//! Utilities for backend implementations

use crate::{Error, Result};
use bytes::{BufMut, BytesMut};

/// A buffer for accumulating SSE (Server-Sent Events) bytes.
///
/// Resilient to UTF-8 characters being split across network chunks:
/// bytes are accumulated and only complete UTF-8 text is returned,
/// with any trailing partial sequence held back for the next push.
#[derive(Debug)]
pub struct SseBuffer {
    buffer: BytesMut,
    max_capacity: usize,
}

impl Default for SseBuffer {
    fn default() -> Self {
        Self {
            buffer: BytesMut::new(),
            max_capacity: 10 * 1024 * 1024, // Default 10MB
        }
    }
}

impl SseBuffer {
    /// Create a new empty SSE buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom capacity limit
    pub fn with_capacity_limit(max_capacity: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            max_capacity,
        }
    }

    fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if self.buffer.len() + bytes.len() > self.max_capacity {
            return Err(Error::StreamInterrupted(format!(
                "SSE buffer exceeded max capacity of {} bytes",
                self.max_capacity
            )));
        }
        self.buffer.put_slice(bytes);
        Ok(())
    }

    /// Append bytes and return all complete UTF-8 text accumulated so far.
    ///
    /// An incomplete trailing UTF-8 sequence stays in the buffer until
    /// its remaining bytes arrive.
    pub fn push_and_get_text(&mut self, bytes: &[u8]) -> Result<String> {
        self.extend_from_slice(bytes)?;

        let bytes = self.buffer.as_ref();
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let text = s.to_string();
                self.buffer.clear();
                Ok(text)
            }
            Err(e) => {
                let valid_len = e.valid_up_to();
                let valid_bytes = self.buffer.split_to(valid_len);
                // The remaining incomplete bytes stay in the buffer
                Ok(String::from_utf8_lossy(&valid_bytes).to_string())
            }
        }
    }
}
