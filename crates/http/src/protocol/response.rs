//! HTTP response types: the supported status codes and the writer state machine.

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::protocol::WriteError;

/// The closed set of status codes a response can carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    BadRequest,
    InternalServerError,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        self.as_http().as_u16()
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    pub fn as_http(&self) -> http::StatusCode {
        match self {
            StatusCode::Ok => http::StatusCode::OK,
            StatusCode::BadRequest => http::StatusCode::BAD_REQUEST,
            StatusCode::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = WriteError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            500 => Ok(StatusCode::InternalServerError),
            other => Err(WriteError::InvalidStatusCode(other)),
        }
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Progress of a response through writing. Strictly forward; no rewinding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteState {
    AwaitingStatusLine,
    AwaitingHeaders,
    AwaitingBody,
    AwaitingChunkedBody,
    Complete,
}

/// Writer operations that move [`WriteState`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum WriteEvent {
    StatusLine,
    Headers,
    Body,
    Chunk,
    ChunkedDone,
}

impl WriteState {
    /// Pure transition function. Any operation outside its required state is rejected with
    /// [`WriteError::InvalidWriterState`] naming the state the operation needs.
    pub(crate) fn on(self, event: WriteEvent) -> Result<WriteState, WriteError> {
        use WriteEvent::*;
        use WriteState::*;

        match (self, event) {
            (AwaitingStatusLine, StatusLine) => Ok(AwaitingHeaders),
            (AwaitingHeaders, Headers) => Ok(AwaitingBody),
            (AwaitingBody, Body) => Ok(Complete),
            (AwaitingBody | AwaitingChunkedBody, Chunk) => Ok(AwaitingChunkedBody),
            (AwaitingChunkedBody, ChunkedDone) => Ok(Complete),
            (state, event) => Err(WriteError::invalid_state(event.required_state(), state)),
        }
    }
}

impl WriteEvent {
    fn required_state(self) -> WriteState {
        match self {
            WriteEvent::StatusLine => WriteState::AwaitingStatusLine,
            WriteEvent::Headers => WriteState::AwaitingHeaders,
            WriteEvent::Body | WriteEvent::Chunk => WriteState::AwaitingBody,
            WriteEvent::ChunkedDone => WriteState::AwaitingChunkedBody,
        }
    }
}

impl Display for WriteState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let str = match self {
            WriteState::AwaitingStatusLine => "awaiting status line",
            WriteState::AwaitingHeaders => "awaiting headers",
            WriteState::AwaitingBody => "awaiting body",
            WriteState::AwaitingChunkedBody => "awaiting chunked body",
            WriteState::Complete => "complete",
        };
        f.write_str(str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_from_u16() {
        assert_eq!(StatusCode::try_from(200).unwrap(), StatusCode::Ok);
        assert_eq!(StatusCode::try_from(400).unwrap(), StatusCode::BadRequest);
        assert_eq!(StatusCode::try_from(500).unwrap(), StatusCode::InternalServerError);
        assert!(matches!(StatusCode::try_from(404), Err(WriteError::InvalidStatusCode(404))));
    }

    #[test]
    fn status_line_text() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::BadRequest.to_string(), "400 Bad Request");
        assert_eq!(StatusCode::InternalServerError.to_string(), "500 Internal Server Error");
    }

    #[test]
    fn fixed_body_path() {
        let state = WriteState::AwaitingStatusLine;
        let state = state.on(WriteEvent::StatusLine).unwrap();
        let state = state.on(WriteEvent::Headers).unwrap();
        let state = state.on(WriteEvent::Body).unwrap();
        assert_eq!(state, WriteState::Complete);
    }

    #[test]
    fn chunked_body_path() {
        let state = WriteState::AwaitingBody.on(WriteEvent::Chunk).unwrap();
        let state = state.on(WriteEvent::Chunk).unwrap();
        assert_eq!(state, WriteState::AwaitingChunkedBody);
        assert_eq!(state.on(WriteEvent::ChunkedDone).unwrap(), WriteState::Complete);
    }

    #[test]
    fn out_of_order_is_rejected() {
        let err = WriteState::AwaitingHeaders.on(WriteEvent::Body).unwrap_err();
        assert!(matches!(
            err,
            WriteError::InvalidWriterState { expected: WriteState::AwaitingBody, actual: WriteState::AwaitingHeaders }
        ));

        assert!(WriteState::Complete.on(WriteEvent::StatusLine).is_err());
        assert!(WriteState::AwaitingChunkedBody.on(WriteEvent::Body).is_err());
        assert!(WriteState::AwaitingBody.on(WriteEvent::ChunkedDone).is_err());
    }
}
