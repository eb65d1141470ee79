//! HTTP request decoder module
//!
//! This module turns raw bytes into a [`Request`]. It has two layers:
//!
//! - [`RequestDecoder`]: a sans-io state machine over [`ParseState`]. It is fed whatever bytes
//!   are buffered and reports how many it could consume; `0` means it needs more data.
//! - [`read_request`]: the driving loop that refills a [`GrowableBuffer`] from an async
//!   source until the start line and header section are parsed, then hands the rest of the
//!   stream to the request body.
//!
//! # Example
//!
//! ```no_run
//! use h1_wire::codec::RequestDecoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let consumed = decoder.parse(b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n").unwrap();
//! assert_eq!(consumed, 47);
//! ```

use tokio::io::AsyncRead;
use tracing::{debug, trace};

use crate::codec::GrowableBuffer;
use crate::codec::header::{HeaderDecoder, HeaderLine, RequestLineDecoder};
use crate::ensure;
use crate::protocol::body::ReqBody;
use crate::protocol::header::is_chunked;
use crate::protocol::{BodyDecodeMode, Headers, ParseError, ParseEvent, ParseState, Request, RequestLine};

/// Incremental parser for the request-line and header section.
///
/// Progress survives across calls, so the request may arrive split at any byte boundary.
#[derive(Debug)]
pub struct RequestDecoder {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: Headers,
    mode: BodyDecodeMode,
    head_size: usize,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Bytes of the request head consumed so far.
    pub fn head_size(&self) -> usize {
        self.head_size
    }

    /// The body framing, known once the header section has ended.
    pub fn body_mode(&self) -> Option<BodyDecodeMode> {
        match self.state {
            ParseState::ReadingStartLine | ParseState::ReadingHeaders => None,
            ParseState::ReadingBody | ParseState::Complete => Some(self.mode),
        }
    }

    /// Parses as much of `src` as possible and returns the number of bytes consumed.
    ///
    /// Stops at the end of the header section; body bytes are never consumed here.
    pub fn parse(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        let mut consumed = 0;
        loop {
            let n = self.parse_single(&src[consumed..])?;
            if n == 0 {
                break;
            }
            consumed += n;
        }

        self.head_size += consumed;
        trace!(consumed, state = %self.state, "parsed request bytes");
        Ok(consumed)
    }

    fn parse_single(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::ReadingStartLine => {
                let Some((request_line, consumed)) = RequestLineDecoder.decode(src)? else {
                    return Ok(0);
                };
                self.request_line = Some(request_line);
                self.advance(ParseEvent::StartLineParsed)?;
                Ok(consumed)
            }

            ParseState::ReadingHeaders => {
                let Some((line, consumed)) = HeaderDecoder.decode_line(src)? else {
                    return Ok(0);
                };
                match line {
                    HeaderLine::Field { name, value: "" } => debug!(name, "skip header with empty value"),
                    HeaderLine::Field { name, value } => self.headers.append(name, value)?,
                    HeaderLine::End => {
                        self.mode = body_mode(&self.headers);
                        self.advance(ParseEvent::HeadersParsed(self.mode))?;
                    }
                }
                Ok(consumed)
            }

            ParseState::ReadingBody | ParseState::Complete => Ok(0),
        }
    }

    fn advance(&mut self, event: ParseEvent) -> Result<(), ParseError> {
        let Some(next) = self.state.on(event) else {
            return Err(ParseError::InvalidState { state: self.state });
        };
        debug!(from = %self.state, to = %next, "request parser advanced");
        self.state = next;
        Ok(())
    }

    /// Hands out the parsed head once the header section has ended.
    pub fn into_parts(self) -> Result<(RequestLine, Headers, BodyDecodeMode), ParseError> {
        ensure!(self.state >= ParseState::ReadingBody, ParseError::InvalidState { state: self.state });
        match self.request_line {
            Some(request_line) => Ok((request_line, self.headers, self.mode)),
            None => Err(ParseError::InvalidState { state: self.state }),
        }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self {
            state: ParseState::ReadingStartLine,
            request_line: None,
            headers: Headers::new(),
            mode: BodyDecodeMode::None,
            head_size: 0,
        }
    }
}

/// Chooses the body framing from the header section.
///
/// `Transfer-Encoding` whose final coding is `chunked` wins over `Content-Length`; a
/// `Content-Length` that is not a non-negative integer means no body.
pub(crate) fn body_mode(headers: &Headers) -> BodyDecodeMode {
    if headers.get("transfer-encoding").is_some_and(is_chunked) {
        return BodyDecodeMode::Chunked;
    }

    match headers.get("content-length").map(parse_content_length) {
        Some(Some(length)) => BodyDecodeMode::FixedLength(length),
        Some(None) => {
            debug!("ignore unparsable content-length");
            BodyDecodeMode::None
        }
        None => BodyDecodeMode::None,
    }
}

/// `Content-Length = 1*DIGIT`; signs and whitespace are rejected.
fn parse_content_length(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Reads one request head from `reader` and returns the request with its lazily read body.
///
/// Fails with [`ParseError::IncompleteRequest`] if the stream ends before the header section
/// does, and with [`ParseError::TooLargeHeader`] once more than `max_header_bytes` are
/// needed for the head.
pub async fn read_request<R>(mut reader: R, max_header_bytes: usize) -> Result<Request<R>, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = GrowableBuffer::new();
    let mut decoder = RequestDecoder::new();

    loop {
        let consumed = decoder.parse(buffer.filled())?;
        buffer.consume(consumed);

        if decoder.state() >= ParseState::ReadingBody {
            break;
        }

        let head_size = decoder.head_size() + buffer.len();
        ensure!(head_size <= max_header_bytes, ParseError::too_large_header(head_size, max_header_bytes));

        if buffer.append(&mut reader).await? == 0 {
            return Err(ParseError::incomplete(decoder.state()));
        }
    }

    let (request_line, headers, mode) = decoder.into_parts()?;
    debug!(%request_line, ?mode, "parsed request head");

    Ok(Request::new(request_line, headers, ReqBody::new(reader, buffer, mode)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DEFAULT_CAPACITY;
    use crate::utils::ChunkReader;
    use bytes::Bytes;
    use http::Method;
    use http_body_util::BodyExt;
    use indoc::indoc;

    fn crlf(text: &str) -> String {
        text.replace('\n', "\r\n")
    }

    async fn read(data: &str, per_read: usize) -> Result<Request<ChunkReader>, ParseError> {
        read_request(ChunkReader::new(data, per_read), DEFAULT_CAPACITY).await
    }

    async fn read_body(request: Request<ChunkReader>) -> Result<Bytes, ParseError> {
        Ok(request.into_body().collect().await?.to_bytes())
    }

    #[tokio::test]
    async fn good_get_request_in_single_bytes() {
        let request = read("GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n", 1).await.unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.target(), "/coffee");
        assert_eq!(request.request_line().to_string(), "GET /coffee HTTP/1.1");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers().get("host"), Some("localhost:42069"));
        assert_eq!(request.body_mode(), BodyDecodeMode::None);
        assert_eq!(request.state(), ParseState::Complete);

        assert!(read_body(request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn split_reads_match_single_read() {
        let input = crlf(indoc! {"
            POST /submit HTTP/1.1
            Host: localhost:42069
            X-Test: first
            Content-Type: text/plain
            x-test: second
            Content-Length: 13

            hello world!
        "});

        let whole = read(&input, input.len()).await.unwrap();
        for per_read in [1, 2, 3, 7, 16] {
            let split = read(&input, per_read).await.unwrap();
            assert_eq!(split.request_line(), whole.request_line(), "per_read {per_read}");
            assert_eq!(split.headers(), whole.headers(), "per_read {per_read}");
            assert_eq!(split.body_mode(), whole.body_mode(), "per_read {per_read}");
            assert_eq!(read_body(split).await.unwrap(), Bytes::from_static(b"hello world!\r"));
        }

        assert_eq!(whole.headers().get("X-TEST"), Some("first, second"));
        assert_eq!(read_body(whole).await.unwrap(), Bytes::from_static(b"hello world!\r"));
    }

    #[tokio::test]
    async fn invalid_header_fails() {
        let err = read("GET /coffee HTTP/1.1\r\nHost localhost:42069\r\n\r\n", 3).await.unwrap_err();
        assert!(matches!(err, ParseError::WellFormednessViolation { .. }));

        let err = read("GET /coffee HTTP/1.1\r\nHost : localhost:42069\r\n\r\n", 3).await.unwrap_err();
        assert!(matches!(err, ParseError::WellFormednessViolation { .. }));
    }

    #[tokio::test]
    async fn invalid_start_line_fails() {
        let err = read("/coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n", 4).await.unwrap_err();
        assert!(matches!(err, ParseError::MalformedStartLine { .. }));
    }

    #[tokio::test]
    async fn missing_end_of_headers_is_incomplete() {
        let err = read("GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n", 5).await.unwrap_err();
        assert!(matches!(err, ParseError::IncompleteRequest { state: ParseState::ReadingHeaders }));

        let err = read("GET /coffee HT", 5).await.unwrap_err();
        assert!(matches!(err, ParseError::IncompleteRequest { state: ParseState::ReadingStartLine }));
    }

    #[tokio::test]
    async fn empty_header_value_is_skipped() {
        let request = read("GET / HTTP/1.1\r\nX-Empty:\r\nHost: a\r\n\r\n", 2).await.unwrap();
        assert!(!request.headers().contains("x-empty"));
        assert_eq!(request.headers().get("host"), Some("a"));
    }

    #[tokio::test]
    async fn content_length_body() {
        let input = "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n";
        let request = read(input, 3).await.unwrap();

        assert_eq!(request.body_mode(), BodyDecodeMode::FixedLength(13));
        assert_eq!(request.state(), ParseState::ReadingBody);
        assert_eq!(read_body(request).await.unwrap(), Bytes::from_static(b"hello world!\n"));
    }

    #[tokio::test]
    async fn short_body_is_incomplete() {
        let input = "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 20\r\n\r\npartial content";
        let request = read(input, 3).await.unwrap();

        let err = read_body(request).await.unwrap_err();
        assert!(matches!(err, ParseError::IncompleteRequest { state: ParseState::ReadingBody }));
    }

    #[tokio::test]
    async fn bytes_past_content_length_are_not_body() {
        let input = "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 2\r\n\r\npartial content";
        let request = read(input, 3).await.unwrap();

        assert_eq!(read_body(request).await.unwrap(), Bytes::from_static(b"pa"));
    }

    #[tokio::test]
    async fn missing_content_length_means_empty_body() {
        let input = "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\n\r\nignored";
        let request = read(input, 3).await.unwrap();

        assert_eq!(request.body_mode(), BodyDecodeMode::None);
        assert!(read_body(request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparsable_content_length_means_empty_body() {
        let input = "POST /submit HTTP/1.1\r\nContent-Length: ten\r\n\r\nignored";
        let request = read(input, 3).await.unwrap();

        assert_eq!(request.body_mode(), BodyDecodeMode::None);
    }

    #[tokio::test]
    async fn chunked_body() {
        let input = crlf(indoc! {"
            POST /submit HTTP/1.1
            Host: localhost:42069
            Transfer-Encoding: chunked
            Content-Length: 3

            d
            hello world!

            5;ext=1
            -more
            0

        "});
        let input = input.replacen("hello world!\r\n", "hello world!\n", 1);

        let request = read(&input, 2).await.unwrap();
        assert_eq!(request.body_mode(), BodyDecodeMode::Chunked);
        assert_eq!(read_body(request).await.unwrap(), Bytes::from_static(b"hello world!\n-more"));
    }

    #[tokio::test]
    async fn chunked_when_last_coding() {
        let input = "POST / HTTP/1.1\r\nTransfer-Encoding: gzip, CHUNKED\r\n\r\n0\r\n\r\n";
        let request = read(input, 4).await.unwrap();
        assert_eq!(request.body_mode(), BodyDecodeMode::Chunked);
    }

    #[tokio::test]
    async fn chunk_longer_than_declared_fails() {
        let input = "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nhello\r\n0\r\n\r\n";
        let request = read(input, 4).await.unwrap();

        let err = read_body(request).await.unwrap_err();
        assert!(matches!(err, ParseError::ChunkLengthMismatch { .. }));
    }

    #[tokio::test]
    async fn trailers_stay_out_of_headers() {
        let input = crlf(indoc! {"
            POST /submit HTTP/1.1
            Host: localhost:42069
            Trailer: X-Checksum
            Transfer-Encoding: chunked

            5
            hello
            0
            X-Checksum: abc

        "});

        let request = read(&input, 3).await.unwrap();
        assert!(!request.headers().contains("x-checksum"));

        let collected = request.into_body().collect().await.unwrap();
        let trailers = collected.trailers().cloned().unwrap();
        assert_eq!(trailers.get("x-checksum").unwrap(), "abc");
        assert_eq!(collected.to_bytes(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn too_large_header_fails() {
        let input = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "a".repeat(256));
        let err = read_request(ChunkReader::new(input, 16), 128).await.unwrap_err();

        assert!(matches!(err, ParseError::TooLargeHeader { max_size: 128, .. }));
    }

    #[test]
    fn decoder_stops_at_end_of_headers() {
        let mut decoder = RequestDecoder::new();
        assert!(decoder.body_mode().is_none());

        let head = "PUT /x HTTP/1.1\r\nContent-Length: 4\r\n\r\n";
        let input = format!("{head}body");

        assert_eq!(decoder.parse(input.as_bytes()).unwrap(), head.len());
        assert_eq!(decoder.state(), ParseState::ReadingBody);
        assert_eq!(decoder.body_mode(), Some(BodyDecodeMode::FixedLength(4)));
        assert_eq!(decoder.parse(b"body").unwrap(), 0);

        let (line, headers, mode) = decoder.into_parts().unwrap();
        assert_eq!(line.target(), "/x");
        assert_eq!(headers.get("content-length"), Some("4"));
        assert_eq!(mode, BodyDecodeMode::FixedLength(4));
    }

    #[test]
    fn decoder_keeps_progress_between_calls() {
        let mut decoder = RequestDecoder::new();

        assert_eq!(decoder.parse(b"GET / HTTP/1.1\r\nHo").unwrap(), 16);
        assert_eq!(decoder.state(), ParseState::ReadingHeaders);
        assert_eq!(decoder.parse(b"Ho").unwrap(), 0);
        assert_eq!(decoder.parse(b"Host: a\r\n\r\n").unwrap(), 11);
        assert_eq!(decoder.state(), ParseState::Complete);
        assert_eq!(decoder.head_size(), 27);
    }

    #[test]
    fn into_parts_before_end_fails() {
        let mut decoder = RequestDecoder::new();
        decoder.parse(b"GET / HTTP/1.1\r\n").unwrap();

        let err = decoder.into_parts().unwrap_err();
        assert!(matches!(err, ParseError::InvalidState { state: ParseState::ReadingHeaders }));
    }

    #[test]
    fn body_mode_selection() {
        let mut headers = Headers::new();
        assert_eq!(body_mode(&headers), BodyDecodeMode::None);

        headers.insert("Content-Length", "42").unwrap();
        assert_eq!(body_mode(&headers), BodyDecodeMode::FixedLength(42));

        headers.insert("Transfer-Encoding", "chunked, gzip").unwrap();
        assert_eq!(body_mode(&headers), BodyDecodeMode::FixedLength(42));

        headers.insert("Transfer-Encoding", "Chunked").unwrap();
        assert_eq!(body_mode(&headers), BodyDecodeMode::Chunked);
    }

    #[test]
    fn content_length_must_be_digits() {
        let mut headers = Headers::new();
        for value in ["+13", "-1", "1 3", "0x1f", "13a"] {
            headers.insert("Content-Length", value).unwrap();
            assert_eq!(body_mode(&headers), BodyDecodeMode::None, "content-length {value}");
        }

        headers.insert("Content-Length", "0013").unwrap();
        assert_eq!(body_mode(&headers), BodyDecodeMode::FixedLength(13));
    }
}
