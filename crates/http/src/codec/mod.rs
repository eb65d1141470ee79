//! HTTP codec module for encoding and decoding HTTP messages
//!
//! Everything here is sans-io except [`read_request`] and [`GrowableBuffer::append`], which
//! read from a `tokio::io::AsyncRead`.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`GrowableBuffer`]: accumulates bytes from the socket, doubling when full
//!   - [`RequestDecoder`]: parses the request-line and header section
//!   - Start line and header parsing via the [`header`] module
//!   - Payload decoding via the [`body`] module
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: the response state machine, encoding into a `BytesMut`
//!   - Status line and header encoding via the [`header`] module
//!   - Chunked encoding via the [`body`] module
//!
//! # Example
//!
//! ```no_run
//! use h1_wire::codec::ResponseEncoder;
//! use h1_wire::protocol::{Headers, StatusCode};
//! use bytes::BytesMut;
//!
//! let mut headers = Headers::new();
//! headers.insert("Content-Type", "text/plain").unwrap();
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut dst = BytesMut::new();
//! encoder.status_line(StatusCode::Ok, &mut dst).unwrap();
//! encoder.write_headers(&headers).unwrap();
//! encoder.body(b"hello", &mut dst).unwrap();
//! ```

pub mod body;
mod buffer;
pub mod header;
mod request_decoder;
mod response_encoder;

pub use buffer::{DEFAULT_CAPACITY, GrowableBuffer};
pub use header::{HeaderEncoder, StatusLineEncoder};
pub use request_decoder::{RequestDecoder, read_request};
pub use response_encoder::ResponseEncoder;
