//! HTTP header line decoder.
//!
//! Parses one CRLF-terminated field line at a time:
//!
//! ```text
//! field-line = field-name ":" OWS field-value OWS CRLF
//! ```
//!
//! A bare CRLF marks the end of the header section. The same decoder is used for the
//! trailer section of a chunked body.
//!
//! # Rules
//!
//! - The line is split on the first `:`
//! - Leading whitespace before the name is dropped, but whitespace between the name and
//!   the colon is rejected (RFC 9112 section 5.1)
//! - The name must be a token (RFC 9110 section 5.6.2)
//! - Optional whitespace around the value is trimmed

use tracing::trace;

use crate::codec::header::find_crlf;
use crate::ensure;
use crate::protocol::ParseError;
use crate::protocol::header::is_token;

/// One decoded line of a header section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine<'a> {
    /// A `name: value` field line
    Field { name: &'a str, value: &'a str },
    /// The empty line that terminates the section
    End,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderDecoder;

impl HeaderDecoder {
    /// Attempts to decode one header line from the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((line, consumed)))` with the number of bytes including the CRLF
    /// - `Ok(None)` if no complete line is buffered yet
    /// - `Err(ParseError::WellFormednessViolation)` if the line is not a valid field line
    pub fn decode_line<'a>(&mut self, src: &'a [u8]) -> Result<Option<(HeaderLine<'a>, usize)>, ParseError> {
        let Some(index) = find_crlf(src) else {
            return Ok(None);
        };

        if index == 0 {
            trace!("reached end of header section");
            return Ok(Some((HeaderLine::End, 2)));
        }

        let line = std::str::from_utf8(&src[..index])
            .map_err(|_| ParseError::well_formedness("header line is not valid utf-8"))?;

        let Some((raw_name, raw_value)) = line.split_once(':') else {
            return Err(ParseError::well_formedness(format!("invalid header, missing colon: '{line}'")));
        };

        let name = raw_name.trim_start_matches([' ', '\t']);
        ensure!(
            !name.ends_with([' ', '\t']),
            ParseError::well_formedness(format!("invalid header, whitespace before colon: '{raw_name}'"))
        );
        // `Host localhost:42069` splits at the port's colon
        ensure!(
            !name.contains([' ', '\t']),
            ParseError::well_formedness(format!("invalid header, missing colon: '{line}'"))
        );
        ensure!(is_token(name), ParseError::well_formedness(format!("invalid character in header name: '{name}'")));

        let value = raw_value.trim_matches([' ', '\t']);

        trace!(name, value, "parsed header line");
        Ok(Some((HeaderLine::Field { name, value }, index + 2)))
    }
}
