//! An HTTP/1.1 codec over raw byte streams
//!
//! This crate parses requests and writes responses directly on top of `tokio` byte streams,
//! without delegating to a pre-built HTTP implementation. Requests may arrive split at any
//! byte boundary; parsing progress is kept across reads in a growable buffer.
//!
//! # Features
//!
//! - Incremental request-line and header parsing with well-formedness checks
//! - Fixed-length and chunked request bodies, exposed as an `http_body::Body`
//! - A response writer that enforces status line, headers, body order
//! - Chunked response bodies with trailer fields
//! - One request per connection; the connection is closed after the response
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use futures::future::BoxFuture;
//! use h1_wire::connection::ResponseWriter;
//! use h1_wire::handler::make_handler;
//! use h1_wire::protocol::{HandlerError, Headers, Request, StatusCode};
//! use h1_wire::server::Server;
//! use http_body_util::BodyExt;
//! use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
//! use tokio_util::sync::CancellationToken;
//! use tracing::info;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder().address("127.0.0.1:42069").build()?.bind().await?;
//!     server.serve(Arc::new(make_handler(hello_world)), CancellationToken::new()).await;
//!     Ok(())
//! }
//!
//! fn hello_world(
//!     request: Request<OwnedReadHalf>,
//!     writer: &mut ResponseWriter<OwnedWriteHalf>,
//! ) -> BoxFuture<'_, Result<(), HandlerError>> {
//!     Box::pin(async move {
//!         info!(target = request.target(), "receiving request");
//!         let body = request.into_body().collect().await?.to_bytes();
//!         info!(len = body.len(), "receiving request body");
//!
//!         let mut headers = Headers::new();
//!         headers.insert("Content-Type", "text/plain")?;
//!
//!         writer.write_status_line(StatusCode::Ok).await?;
//!         writer.write_headers(&headers)?;
//!         writer.write_body(b"Hello World!\r\n").await?;
//!         Ok(())
//!     })
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: sans-io parsing and encoding, plus the growable read buffer
//! - [`protocol`]: requests, headers, status codes, state machines and errors
//! - [`connection`]: one request/response exchange over a byte stream
//! - [`handler`]: the request handler capability
//! - [`server`]: the TCP accept loop with cooperative shutdown
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type of a connection
//! - [`protocol::ParseError`]: Request parsing errors
//! - [`protocol::WriteError`]: Response writing errors
//!
//! # Limitations
//!
//! - HTTP/1.1 only, no persistent connections
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Responses are limited to `200 OK`, `400 Bad Request` and `500 Internal Server Error`

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
