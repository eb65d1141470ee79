//! Decoder implementation for HTTP message payloads.
//!
//! This module provides a unified decoder for handling different types of HTTP message bodies:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Messages with no body
//!
//! The strategy is fixed by the [`BodyDecodeMode`] chosen when the header section ends.

use crate::codec::GrowableBuffer;
use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{BodyDecodeMode, Headers, ParseError, ParseState, PayloadItem};

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Handle messages with no body
    NoBody,
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    ///
    /// # Arguments
    /// * `size` - The expected content length in bytes
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// The framing this decoder was built for.
    pub fn mode(&self) -> BodyDecodeMode {
        match &self.kind {
            Kind::Length(length_decoder) => BodyDecodeMode::FixedLength(length_decoder.remaining()),
            Kind::Chunked(_) => BodyDecodeMode::Chunked,
            Kind::NoBody => BodyDecodeMode::None,
        }
    }

    /// Decodes bytes from the input buffer using the appropriate strategy.
    ///
    /// # Returns
    /// * Delegates to the specific decoder implementation, or
    /// * Returns EOF immediately for no-body messages
    pub fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<PayloadItem>, ParseError> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }

    /// The error to report when the source ends before the payload does.
    pub fn eof_error(&self) -> ParseError {
        match &self.kind {
            Kind::Length(length_decoder) => length_decoder.eof_error(),
            Kind::Chunked(chunked_decoder) => chunked_decoder.eof_error(),
            Kind::NoBody => ParseError::incomplete(ParseState::ReadingBody),
        }
    }

    /// Trailer fields of a finished chunked payload, if any were sent.
    pub fn take_trailers(&mut self) -> Option<Headers> {
        match &mut self.kind {
            Kind::Chunked(chunked_decoder) => chunked_decoder.take_trailers(),
            Kind::Length(_) | Kind::NoBody => None,
        }
    }
}

impl From<BodyDecodeMode> for PayloadDecoder {
    fn from(mode: BodyDecodeMode) -> Self {
        match mode {
            BodyDecodeMode::None => Self::empty(),
            BodyDecodeMode::FixedLength(size) => Self::fix_length(size),
            BodyDecodeMode::Chunked => Self::chunked(),
        }
    }
}
