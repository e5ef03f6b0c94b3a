//! Tokio codec for the line-oriented management protocol

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::error::ProtocolError;

/// Default maximum inbound line length (64 KiB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Codec splitting inbound bytes into lines and encoding outbound commands
///
/// Inbound lines are split on `\n` with a trailing `\r` stripped. Outbound
/// commands are written with a single `\n` terminator.
#[derive(Debug)]
pub struct ManagementCodec {
    /// Longest line accepted before the decoder errors
    max_line_length: usize,
    /// Bytes already scanned for a newline in the current buffer
    next_index: usize,
}

impl ManagementCodec {
    /// Create a new codec with the default line limit
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a new codec with a custom line limit
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
        }
    }

    fn take_line(
        &mut self,
        src: &mut BytesMut,
        len: usize,
        skip: usize,
    ) -> Result<String, ProtocolError> {
        let mut line = src.split_to(len);
        src.advance(skip);
        self.next_index = 0;

        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        String::from_utf8(line.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }
}

impl Default for ManagementCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ManagementCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Only scan bytes we have not looked at yet
        let newline = src[self.next_index..].iter().position(|b| *b == b'\n');

        match newline {
            Some(offset) => {
                let len = self.next_index + offset;
                if len > self.max_line_length {
                    return Err(ProtocolError::LineTooLong {
                        size: len,
                        max: self.max_line_length,
                    });
                }
                self.take_line(src, len, 1).map(Some)
            }
            None => {
                if src.len() > self.max_line_length {
                    return Err(ProtocolError::LineTooLong {
                        size: src.len(),
                        max: self.max_line_length,
                    });
                }
                self.next_index = src.len();
                Ok(None) // Need more data
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        // Unterminated final line
        if src.is_empty() {
            Ok(None)
        } else {
            let len = src.len();
            self.take_line(src, len, 0).map(Some)
        }
    }
}

impl Encoder<Command> for ManagementCodec {
    type Error = ProtocolError;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = command.to_string();
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
