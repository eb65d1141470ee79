//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module provides functionality to decode HTTP messages that use chunked transfer encoding
//! as specified in [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1).
//!
//! The chunked encoding allows the sender to transmit message data in a series of chunks,
//! indicating the size of each chunk before its data:
//!
//! ```text
//! chunked-body = *chunk last-chunk trailer-section CRLF
//! chunk        = chunk-size [ chunk-ext ] CRLF chunk-data CRLF
//! last-chunk   = 1*("0") [ chunk-ext ] CRLF
//! ```
//!
//! Trailer fields are parsed with the same rules as header fields and kept apart from the
//! request headers; callers collect them with [`ChunkedDecoder::take_trailers`].

use std::cmp;

use tracing::trace;

use crate::codec::GrowableBuffer;
use crate::codec::header::{HeaderDecoder, HeaderLine, find_crlf};
use crate::ensure;
use crate::protocol::{Headers, ParseError, ParseState, PayloadItem};
use ChunkedState::*;

/// A decoder for handling HTTP chunked transfer encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    trailers: Headers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the `SIZE-HEX [; ext] CRLF` line
    AwaitingChunkSizeLine,
    /// Deliver chunk data; at `remaining == 0` the CRLF closing the chunk is expected
    AwaitingChunkData { remaining: u64 },
    /// Read trailer field lines up to the terminating empty line
    AwaitingTrailers,
    /// Final state after the terminating empty line
    Done,
}

impl ChunkedDecoder {
    /// Creates a new ChunkedDecoder, ready to read the size line of the first chunk.
    pub fn new() -> Self {
        Self { state: AwaitingChunkSizeLine, trailers: Headers::new() }
    }

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` when (part of) a chunk is decoded
    /// - `Ok(Some(PayloadItem::Eof))` once the last chunk and trailer section are read
    /// - `Ok(None)` when more data is needed
    /// - `Err(ParseError)` if the chunked encoding is invalid
    pub fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<PayloadItem>, ParseError> {
        loop {
            match self.state {
                Done => {
                    trace!("finished reading chunked data");
                    return Ok(Some(PayloadItem::Eof));
                }

                AwaitingChunkSizeLine => {
                    let Some(index) = find_crlf(src.filled()) else {
                        return Ok(None);
                    };
                    let size = parse_chunk_size(&src.filled()[..index])?;
                    src.consume(index + 2);

                    trace!(size, "read chunk size line");
                    self.state = if size == 0 { AwaitingTrailers } else { AwaitingChunkData { remaining: size } };
                }

                AwaitingChunkData { remaining: 0 } => match src.filled() {
                    [b'\r', b'\n', ..] => {
                        src.consume(2);
                        self.state = AwaitingChunkSizeLine;
                    }
                    [] | [b'\r'] => return Ok(None),
                    _ => return Err(ParseError::chunk_length_mismatch("chunk data is longer than its declared size")),
                },

                AwaitingChunkData { remaining } => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    // cap remaining bytes at what is buffered
                    let read_size = cmp::min(remaining, src.len() as u64) as usize;
                    let bytes = src.split_to(read_size);
                    self.state = AwaitingChunkData { remaining: remaining - read_size as u64 };

                    trace!(len = bytes.len(), "read chunked bytes");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                AwaitingTrailers => {
                    let Some((line, consumed)) = HeaderDecoder.decode_line(src.filled())? else {
                        return Ok(None);
                    };
                    match line {
                        HeaderLine::Field { name, value: "" } => trace!(name, "skip empty trailer field"),
                        HeaderLine::Field { name, value } => self.trailers.append(name, value)?,
                        HeaderLine::End => self.state = Done,
                    }
                    src.consume(consumed);
                }
            }
        }
    }

    /// Returns the trailer fields once the body is done, if the peer sent any.
    pub fn take_trailers(&mut self) -> Option<Headers> {
        if self.state != Done || self.trailers.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.trailers))
    }

    /// The error to report when the stream ends before the last chunk was read.
    pub fn eof_error(&self) -> ParseError {
        match self.state {
            AwaitingChunkData { remaining: 0 } => {
                ParseError::chunk_length_mismatch("stream ended before the CRLF closing a chunk")
            }
            AwaitingChunkData { remaining } => {
                ParseError::chunk_length_mismatch(format!("stream ended with {remaining} bytes of chunk data missing"))
            }
            AwaitingChunkSizeLine | AwaitingTrailers | Done => ParseError::incomplete(ParseState::ReadingBody),
        }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a chunk size line (without its CRLF): hex digits, optional whitespace, and
/// optional extensions after `;`, which are ignored.
fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::well_formedness("chunk size line is not valid utf-8"))?;

    let size = match line.split_once(';') {
        Some((size, _extensions)) => size,
        None => line,
    };
    let size = size.trim_matches([' ', '\t']);

    ensure!(
        !size.is_empty() && size.bytes().all(|b| b.is_ascii_hexdigit()),
        ParseError::well_formedness(format!("invalid chunk size line: '{line}'"))
    );

    u64::from_str_radix(size, 16)
        .map_err(|_| ParseError::well_formedness(format!("invalid overflow chunked length: '{size}'")))
}
