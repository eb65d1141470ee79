//! Decoder for the request-line, the first line of an HTTP request.
//!
//! Accepts exactly `METHOD SP TARGET SP HTTP/1.1 CRLF` where the method is made of
//! upper-case ASCII letters and the target starts with `/`. Anything else is a
//! [`ParseError::MalformedStartLine`].

use http::{Method, Version};
use tracing::trace;

use crate::codec::header::find_crlf;
use crate::ensure;
use crate::protocol::{ParseError, RequestLine};

const HTTP_11: &str = "HTTP/1.1";

#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLineDecoder;

impl RequestLineDecoder {
    /// Attempts to decode the request-line from the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((line, consumed)))` where `consumed` is the line length plus the CRLF
    /// - `Ok(None)` if no complete line is buffered yet
    /// - `Err(ParseError::MalformedStartLine)` if the line is not a valid HTTP/1.1 request-line
    pub fn decode(&mut self, src: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
        let Some(index) = find_crlf(src) else {
            return Ok(None);
        };

        let line = std::str::from_utf8(&src[..index])
            .map_err(|_| ParseError::malformed_start_line("request line is not valid utf-8"))?;

        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ParseError::malformed_start_line(format!(
                "request line must have 3 space-separated parts, found {}",
                parts.len()
            )));
        };

        ensure!(
            !method.is_empty() && method.bytes().all(|b| b.is_ascii_uppercase()),
            ParseError::malformed_start_line(format!("request method '{method}' must only contain uppercase letters"))
        );
        ensure!(
            target.starts_with('/'),
            ParseError::malformed_start_line(format!("request target '{target}' must start with a slash"))
        );
        ensure!(
            version == HTTP_11,
            ParseError::malformed_start_line(format!("http version '{version}' is not supported, must be {HTTP_11}"))
        );

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| ParseError::malformed_start_line(format!("invalid request method: {e}")))?;

        trace!(%method, target, "parsed request line");
        Ok(Some((RequestLine::new(method, target.to_owned(), Version::HTTP_11), index + 2)))
    }
}
