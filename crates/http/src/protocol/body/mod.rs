//! HTTP request body handling.
//!
//! - [`ReqBody`]: implements `http_body::Body` over the read half of a connection
//!
//! The body continues from the bytes the request decoder buffered past the header section,
//! so nothing read from the socket is lost between parsing the head and reading the body.

mod req_body;

pub use req_body::ReqBody;
