use std::error::Error;
use std::io;
use thiserror::Error;

use crate::protocol::{ParseState, WriteState};

/// Boxed error returned by request handlers.
pub type HandlerError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: WriteError,
    },

    #[error("handler error: {cause}")]
    Handler { cause: HandlerError },
}

impl HttpError {
    pub fn handler<E: Into<HandlerError>>(e: E) -> Self {
        Self::Handler { cause: e.into() }
    }
}

/// Rejections raised by [`Headers`](crate::protocol::Headers) when a field is stored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("header name is empty")]
    EmptyName,

    #[error("header value is empty for '{name}'")]
    EmptyValue { name: String },

    #[error("invalid character in header name: '{name}'")]
    InvalidName { name: String },

    #[error("invalid character in header value for '{name}'")]
    InvalidValue { name: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed start line: {reason}")]
    MalformedStartLine { reason: String },

    #[error("well-formedness violation: {reason}")]
    WellFormednessViolation { reason: String },

    #[error("incomplete request, reached end of stream while {state}")]
    IncompleteRequest { state: ParseState },

    #[error("chunk length mismatch: {reason}")]
    ChunkLengthMismatch { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("request parser can't advance from state {state}")]
    InvalidState { state: ParseState },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_start_line<S: ToString>(str: S) -> Self {
        Self::MalformedStartLine { reason: str.to_string() }
    }

    pub fn well_formedness<S: ToString>(str: S) -> Self {
        Self::WellFormednessViolation { reason: str.to_string() }
    }

    pub fn incomplete(state: ParseState) -> Self {
        Self::IncompleteRequest { state }
    }

    pub fn chunk_length_mismatch<S: ToString>(str: S) -> Self {
        Self::ChunkLengthMismatch { reason: str.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

impl From<HeaderError> for ParseError {
    fn from(e: HeaderError) -> Self {
        Self::well_formedness(e)
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("invalid writer state: expected {expected}, actual {actual}")]
    InvalidWriterState { expected: WriteState, actual: WriteState },

    #[error("Content-Type header is required to write a body")]
    MissingContentType,

    #[error("unsupported response status code: {0}")]
    InvalidStatusCode(u16),

    #[error("trailer '{name}' was not declared before the body")]
    UndeclaredTrailer { name: String },

    #[error("chunked body requires chunked as the final transfer coding, got '{transfer_encoding}'")]
    NotChunked { transfer_encoding: String },

    #[error("invalid header: {source}")]
    InvalidHeader {
        #[from]
        source: HeaderError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl WriteError {
    pub fn invalid_state(expected: WriteState, actual: WriteState) -> Self {
        Self::InvalidWriterState { expected, actual }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
