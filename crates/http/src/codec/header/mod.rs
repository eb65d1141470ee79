//! Start line and header section processing.
//!
//! # Components
//!
//! - [`RequestLineDecoder`]: decodes `METHOD SP TARGET SP HTTP/1.1 CRLF`
//! - [`HeaderDecoder`]: decodes one field line at a time, or the empty line ending the section
//! - [`StatusLineEncoder`]: writes the response status line
//! - [`HeaderEncoder`]: writes a block of fields followed by the empty line
//!
//! Decoders work on whatever bytes are currently buffered and report how many bytes they
//! consumed; they never consume a partial line.

mod header_decoder;
mod header_encoder;
mod request_line_decoder;

pub use header_decoder::{HeaderDecoder, HeaderLine};
pub use header_encoder::{HeaderEncoder, StatusLineEncoder};
pub use request_line_decoder::RequestLineDecoder;

/// Position of the first CRLF in `src`, if any.
#[inline]
pub(crate) fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(2).position(|window| window == b"\r\n")
}
