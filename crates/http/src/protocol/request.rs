//! HTTP request types.
//!
//! A [`Request`] is produced once per connection by the request decoder. The start line and
//! header section are parsed eagerly; the body is read lazily by whoever owns the request.

use std::fmt;
use std::fmt::{Display, Formatter};

use http::{Method, Version};

use crate::protocol::body::ReqBody;
use crate::protocol::{BodyDecodeMode, Headers};

/// The parsed request-line: `METHOD SP TARGET SP HTTP/1.1`.
///
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    version: Version,
}

impl RequestLine {
    pub(crate) fn new(method: Method, target: String, version: Version) -> Self {
        Self { method, target, version }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request-target, always starting with `/`.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

impl Display for RequestLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.method, self.target, self.version)
    }
}

/// Progress of a request through parsing. Only ever moves forward.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseState {
    ReadingStartLine,
    ReadingHeaders,
    ReadingBody,
    Complete,
}

/// Inputs that drive [`ParseState`] forward.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ParseEvent {
    StartLineParsed,
    HeadersParsed(BodyDecodeMode),
    BodyFinished,
}

impl ParseState {
    /// Pure transition function; `None` means the event is not valid in this state.
    pub(crate) fn on(self, event: ParseEvent) -> Option<ParseState> {
        use ParseEvent::*;
        use ParseState::*;

        match (self, event) {
            (ReadingStartLine, StartLineParsed) => Some(ReadingHeaders),
            (ReadingHeaders, HeadersParsed(BodyDecodeMode::None)) => Some(Complete),
            (ReadingHeaders, HeadersParsed(_)) => Some(ReadingBody),
            (ReadingBody, BodyFinished) => Some(Complete),
            (ReadingStartLine | ReadingHeaders | ReadingBody | Complete, _) => None,
        }
    }
}

impl Display for ParseState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let str = match self {
            ParseState::ReadingStartLine => "reading start line",
            ParseState::ReadingHeaders => "reading headers",
            ParseState::ReadingBody => "reading body",
            ParseState::Complete => "complete",
        };
        f.write_str(str)
    }
}

/// A parsed request owning the read half of its connection through its body.
#[derive(Debug)]
pub struct Request<R> {
    request_line: RequestLine,
    headers: Headers,
    body: ReqBody<R>,
}

impl<R> Request<R> {
    pub(crate) fn new(request_line: RequestLine, headers: Headers, body: ReqBody<R>) -> Self {
        Self { request_line, headers, body }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &Method {
        self.request_line.method()
    }

    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body_mode(&self) -> BodyDecodeMode {
        self.body.mode()
    }

    /// `ReadingBody` until the body has been read to its end, then `Complete`.
    pub fn state(&self) -> ParseState {
        self.body.state()
    }

    pub fn body_mut(&mut self) -> &mut ReqBody<R> {
        &mut self.body
    }

    pub fn into_body(self) -> ReqBody<R> {
        self.body
    }

    pub fn into_parts(self) -> (RequestLine, Headers, ReqBody<R>) {
        (self.request_line, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_move_forward_only() {
        use ParseEvent::*;
        use ParseState::*;

        assert_eq!(ReadingStartLine.on(StartLineParsed), Some(ReadingHeaders));
        assert_eq!(ReadingHeaders.on(HeadersParsed(BodyDecodeMode::Chunked)), Some(ReadingBody));
        assert_eq!(ReadingHeaders.on(HeadersParsed(BodyDecodeMode::FixedLength(3))), Some(ReadingBody));
        assert_eq!(ReadingHeaders.on(HeadersParsed(BodyDecodeMode::None)), Some(Complete));
        assert_eq!(ReadingBody.on(BodyFinished), Some(Complete));

        assert_eq!(ReadingHeaders.on(StartLineParsed), None);
        assert_eq!(Complete.on(BodyFinished), None);
        assert_eq!(ReadingStartLine.on(BodyFinished), None);
    }

    #[test]
    fn request_line_display() {
        let line = RequestLine::new(Method::GET, "/coffee".into(), Version::HTTP_11);
        assert_eq!(line.to_string(), "GET /coffee HTTP/1.1");
    }
}
