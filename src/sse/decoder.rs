//! Incremental byte-to-line decoding for streamed response bodies.

use bytes::BytesMut;

/// Splits raw byte chunks from a network read loop into complete
/// newline-terminated text lines.
///
/// Chunk boundaries are arbitrary: a line, or a single multi-byte UTF-8
/// character, may arrive split across chunks. Bytes are buffered until a
/// `\n` shows up and each line is decoded whole, so a character is never
/// torn at a chunk boundary (`\n` is a single byte that cannot occur
/// inside a multi-byte sequence). Trailing `\r` is stripped.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: BytesMut,
}

impl LineDecoder {
    /// Create a new decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every line it completes.
    ///
    /// An incomplete trailing fragment stays buffered and is prepended
    /// to the next chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line = self.buf.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Signal end-of-stream. A buffered partial line cannot be a
    /// complete event and is discarded; returns how many bytes were
    /// dropped so the caller can log it.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf.clear();
        dropped
    }

    /// Number of bytes currently buffered awaiting a newline.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
