//! HTTP connection handling module
//!
//! # Components
//!
//! - [`HttpConnection`]: serves one request/response exchange over a byte stream:
//!   - Parses the request, answering `400 Bad Request` when that fails
//!   - Calls the [`Handler`](crate::handler::Handler) with the request and a response writer
//!   - Answers `500 Internal Server Error` if the handler fails before writing anything
//!   - Shuts the write half down once the handler returns; connections are never reused
//! - [`ResponseWriter`]: the response state machine bound to an async byte sink
//! - [`ConnectionConfig`]: limits for reading the request head

mod http_connection;
mod response_writer;

pub use http_connection::ConnectionConfig;
pub use http_connection::HttpConnection;
pub use response_writer::ResponseWriter;
