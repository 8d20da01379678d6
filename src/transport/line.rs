//! Line framing codec for tokio.
//!
//! Splits the inbound byte stream into CR/LF-terminated lines and frames
//! outbound lines with CRLF. Input is lenient: CRLF, bare CR, and bare LF
//! all terminate a line, and blank lines are swallowed.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{TransportError, MAX_LINE_LEN};

/// Codec producing one `String` per protocol line.
pub struct LineCodec {
    /// Index of the next byte to check for a terminator.
    next_index: usize,
    /// A bare CR ended the previous line at a buffer boundary; a leading
    /// LF in the next chunk belongs to that terminator.
    pending_lf: bool,
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default [`MAX_LINE_LEN`] cap.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            pending_lf: false,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, TransportError> {
        loop {
            if self.pending_lf {
                if src.is_empty() {
                    return Ok(None);
                }
                if src[0] == b'\n' {
                    src.advance(1);
                }
                self.pending_lf = false;
            }

            let found = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\r' || *b == b'\n')
                .map(|offset| self.next_index + offset);

            let Some(index) = found else {
                self.next_index = src.len();
                if src.len() > self.max_len {
                    return Err(TransportError::LineTooLong(src.len()));
                }
                return Ok(None);
            };

            let terminator = src[index];
            let line = src.split_to(index);
            src.advance(1);
            self.next_index = 0;

            if terminator == b'\r' {
                match src.first() {
                    Some(b'\n') => src.advance(1),
                    Some(_) => {}
                    // CR at the end of the buffer: its LF may arrive with
                    // the next chunk.
                    None => self.pending_lf = true,
                }
            }

            if line.is_empty() {
                continue;
            }
            if line.len() > self.max_len {
                return Err(TransportError::LineTooLong(line.len()));
            }

            return String::from_utf8(line.to_vec())
                .map(Some)
                .map_err(|_| TransportError::InvalidUtf8);
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = TransportError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), TransportError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        dst.extend_from_slice(trimmed.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
